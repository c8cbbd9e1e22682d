use secrecy::SecretString;
use serde::Deserialize;
use validator::Validate;

use super::{FormErrors, Submission, required};

/// Email and plaintext password that passed form validation.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

#[derive(Deserialize, Validate, Default)]
#[serde(default)]
pub struct LoginForm {
    #[validate(
        custom(function = "required"),
        email(message = "Invalid email address."),
        length(min = 1, max = 64, message = "Field must be between 1 and 64 characters long.")
    )]
    pub email: String,

    #[validate(
        custom(function = "required"),
        length(min = 8, max = 72, message = "Field must be between 8 and 72 characters long.")
    )]
    pub pwd: String,
}

impl Submission for LoginForm {
    type Output = Credentials;

    fn validated(&self) -> Result<Credentials, FormErrors> {
        self.validate()?;
        Ok(Credentials {
            email: self.email.clone(),
            password: SecretString::from(self.pwd.clone()),
        })
    }
}

#[derive(Deserialize, Validate, Default)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(
        custom(function = "required"),
        email(message = "Invalid email address."),
        length(min = 1, max = 64, message = "Field must be between 1 and 64 characters long.")
    )]
    pub email: String,

    #[validate(
        custom(function = "required"),
        length(min = 6, max = 25, message = "Field must be between 6 and 25 characters long.")
    )]
    pub pwd: String,

    #[serde(alias = "cpwd")]
    #[validate(
        custom(function = "required"),
        length(min = 6, max = 25, message = "Field must be between 6 and 25 characters long."),
        must_match(other = "pwd", message = "Passwords must match !")
    )]
    pub confirm_pwd: String,
}

impl Submission for RegisterForm {
    type Output = Credentials;

    fn validated(&self) -> Result<Credentials, FormErrors> {
        self.validate()?;
        Ok(Credentials {
            email: self.email.clone(),
            password: SecretString::from(self.pwd.clone()),
        })
    }
}
