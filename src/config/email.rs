//! Email configuration (Resend)

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub resend_api_key: String,

    #[serde(default = "default_from_email")]
    pub from_email: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// `Name <address>` for the From header.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resend_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("EMAIL__RESEND_API_KEY"));
        }
        if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_from_email() -> String {
    "frontdesk@gymdesk.app".to_string()
}

fn default_from_name() -> String {
    "GymDesk".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> EmailConfig {
        EmailConfig {
            resend_api_key: "re_live_abc".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn from_header_combines_name_and_address() {
        assert_eq!(valid().from_header(), "GymDesk <frontdesk@gymdesk.app>");
    }

    #[test]
    fn key_without_resend_prefix_is_rejected() {
        let config = EmailConfig {
            resend_api_key: "sk_live_abc".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidResendKey)));
    }

    #[test]
    fn from_address_must_look_like_email() {
        let config = EmailConfig {
            from_email: "frontdesk".to_string(),
            ..valid()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidFromEmail)));
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }
}
