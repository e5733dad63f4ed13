pub mod a001_quiz;
