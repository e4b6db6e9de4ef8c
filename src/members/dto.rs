use serde::Serialize;

use crate::{
    members::repo_types::{Member, MemberChanges},
    validation::{self, CharField, FieldErrors, Payload, NON_FIELD_ERRORS},
};

const NAME_MAX_LENGTH: usize = 150;
const EMAIL_MAX_LENGTH: usize = 254;
const PASSWORD_MAX_LENGTH: usize = 128;

fn username_field() -> CharField {
    CharField::required("username")
        .max_length(NAME_MAX_LENGTH)
        .format(validation::username)
}

/// Blank is stored as `""`; anything else must look like an address.
fn email_field() -> CharField {
    CharField::required("email")
        .allow_blank()
        .max_length(EMAIL_MAX_LENGTH)
        .format(validation::email)
}

/// Body of `POST /members/signup/` and `POST /members/`.
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl SignupRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = username_field().clean(payload, &mut errors);
        let email = email_field().clean(payload, &mut errors);
        let password = CharField::required("password")
            .max_length(PASSWORD_MAX_LENGTH)
            .clean(payload, &mut errors);
        let password_confirmation = CharField::required("password_confirmation")
            .aliases(&["password2"])
            .clean(payload, &mut errors);

        match (username, email, password, password_confirmation) {
            (Some(username), Some(email), Some(password), Some(password_confirmation))
                if errors.is_empty() =>
            {
                Ok(Self {
                    username,
                    email,
                    password,
                    password_confirmation,
                })
            }
            _ => Err(errors),
        }
    }

    /// Cross-field rule, checked once every field is individually valid.
    pub fn ensure_passwords_match(&self) -> Result<(), FieldErrors> {
        if self.password == self.password_confirmation {
            Ok(())
        } else {
            Err(FieldErrors::single(NON_FIELD_ERRORS, "Passwords must match."))
        }
    }
}

/// Body of `PUT /members/{id}/`. Every field is optional.
pub struct UpdateMemberRequest {
    pub changes: MemberChanges,
}

impl UpdateMemberRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let changes = MemberChanges {
            username: username_field().partial().clean(payload, &mut errors),
            email: email_field().partial().clean(payload, &mut errors),
            first_name: CharField::optional("first_name")
                .max_length(NAME_MAX_LENGTH)
                .clean(payload, &mut errors),
            last_name: CharField::optional("last_name")
                .max_length(NAME_MAX_LENGTH)
                .clean(payload, &mut errors),
        };
        errors.check()?;
        Ok(Self { changes })
    }
}

/// Public part of a member returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicMember {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<Member> for PublicMember {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            username: member.username,
            email: member.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
