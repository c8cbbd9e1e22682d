use sqlx::prelude::FromRow;

/// A registered account. `pwd` holds the argon2 PHC string, never the plaintext.
#[derive(Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub email: String,
    pub pwd: String,
}

impl std::fmt::Debug for UserModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserModel")
            .field("id", &self.id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Identity bound to the request's session.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

impl From<&UserModel> for CurrentUser {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}
