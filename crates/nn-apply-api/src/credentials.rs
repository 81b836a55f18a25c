use std::str::FromStr;

/// Credentials to connect to the annotation platform.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    api_token: String,
}

impl ApiCredentials {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
        }
    }

    pub(crate) fn token(&self) -> &str {
        &self.api_token
    }
}

impl FromStr for ApiCredentials {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            Err("API token cannot be empty".to_string())
        } else {
            Ok(Self::new(s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        assert!("".parse::<ApiCredentials>().is_err());
    }

    #[test]
    fn token_is_kept_verbatim() {
        let creds: ApiCredentials = "abc123".parse().unwrap();
        assert_eq!(creds.token(), "abc123");
    }
}
