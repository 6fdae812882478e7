/// Supplies the bearer credential attached to backend requests.
pub trait SessionProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct NoSession;

impl SessionProvider for NoSession {
    fn access_token(&self) -> Option<String> {
        None
    }
}

#[derive(Clone, Debug)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.trim().to_string(),
        }
    }
}

impl SessionProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        if self.token.is_empty() {
            None
        } else {
            Some(self.token.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_static_token_yields_nothing() {
        assert_eq!(StaticToken::new("  ").access_token(), None);
        assert_eq!(StaticToken::new(" abc ").access_token(), Some("abc".to_string()));
        assert_eq!(NoSession.access_token(), None);
    }
}
