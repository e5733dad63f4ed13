/// Hard navigation to the login entry point after the session is invalidated
pub trait LoginRedirect {
    fn redirect_to_login(&self);
}

/// Reloads the page at the login path
#[derive(Debug, Clone)]
pub struct BrowserRedirect {
    login_path: String,
}

impl BrowserRedirect {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }
}

impl LoginRedirect for BrowserRedirect {
    fn redirect_to_login(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(&self.login_path) {
            log::error!("Redirect to {} failed: {:?}", self.login_path, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::LoginRedirect;

    /// Counts redirects instead of navigating
    #[derive(Debug, Clone, Default)]
    pub struct RecordingRedirect {
        count: Rc<Cell<usize>>,
    }

    impl RecordingRedirect {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self) -> usize {
            self.count.get()
        }
    }

    impl LoginRedirect for RecordingRedirect {
        fn redirect_to_login(&self) {
            self.count.set(self.count.get() + 1);
        }
    }
}
