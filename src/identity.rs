use serde::{Serialize, Deserialize};

/// Signed-in user as reported by the external identity provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserIdentity {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,
}

impl UserIdentity {
    /// Display name, else the local part of the email, else "User".
    pub fn label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        match self.email.as_deref().and_then(|e| e.split('@').next()).filter(|p| !p.is_empty()) {
            Some(local) => local.to_string(),
            None => "User".to_string(),
        }
    }
}

pub fn is_signed_in(user: Option<&UserIdentity>) -> bool {
    user.is_some()
}

/// Bearer token to attach to scoring requests, if a user is present.
pub fn bearer_token(user: Option<&UserIdentity>) -> Option<String> {
    user.and_then(|u| u.token.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: Option<&str>, email: Option<&str>) -> UserIdentity {
        UserIdentity {
            display_name: name.map(String::from),
            email: email.map(String::from),
            token: Some("token-123".to_string()),
        }
    }

    #[test]
    fn test_label_fallbacks() {
        assert_eq!(user(Some("Minji Kim"), Some("minji@example.com")).label(), "Minji Kim");
        assert_eq!(user(None, Some("minji@example.com")).label(), "minji");
        assert_eq!(user(Some("  "), None).label(), "User");
    }

    #[test]
    fn test_presence_and_token() {
        let signed_in = user(None, None);
        assert!(is_signed_in(Some(&signed_in)));
        assert!(!is_signed_in(None));
        assert_eq!(bearer_token(Some(&signed_in)), Some("token-123".to_string()));
        assert_eq!(bearer_token(None), None);
    }
}
