use serde::{Deserialize, Serialize};

use crate::{error::ApiError, validate};

use super::repo_types::{User, UserStatus, UserUpdate};

/// Admin-side create: unlike registration, the admin flag and status are
/// settable.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile_no: Option<String>,
    pub is_admin: Option<bool>,
    pub status: Option<UserStatus>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate::check_name(&self.name)?;
        validate::check_email(&self.email)?;
        validate::check_password(&self.password)?;
        if let Some(mobile) = &self.mobile_no {
            validate::check_mobile(mobile)?;
        }
        Ok(())
    }
}

/// Update payload. A `password` key in the body is simply ignored: the
/// password cannot be changed through this path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_no: Option<String>,
    pub is_admin: Option<bool>,
    pub status: Option<UserStatus>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            validate::check_name(name)?;
        }
        if let Some(email) = &self.email {
            validate::check_email(email)?;
        }
        if let Some(mobile) = &self.mobile_no {
            validate::check_mobile(mobile)?;
        }
        Ok(())
    }

    pub fn into_changes(self) -> UserUpdate {
        UserUpdate {
            name: self.name,
            email: self.email.map(|e| e.trim().to_lowercase()),
            mobile_no: self.mobile_no,
            is_admin: self.is_admin,
            status: self.status,
        }
    }
}

/// Response for admin create: the created user plus its freshly signed
/// token.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_ignores_a_password_key() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"name":"Bob Jones","password":"sneaky-change"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Bob Jones"));
        // No field to land in; the update struct simply has no password.
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_accepts_admin_and_status() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"name":"Carol Admin","email":"carol@example.com","password":"longpass1","isAdmin":true,"status":"inactive"}"#,
        )
        .unwrap();
        assert_eq!(req.is_admin, Some(true));
        assert_eq!(req.status, Some(UserStatus::Inactive));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_validates_present_fields_only() {
        let ok = UpdateUserRequest {
            mobile_no: Some("0123456789".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = UpdateUserRequest {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn created_user_response_never_contains_the_hash() {
        let resp = CreatedUserResponse {
            user: User::sample(),
            token: "tok".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("token"));
    }
}
