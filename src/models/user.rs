use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{default_true, Entity, EntityKind};
use crate::validation::{check, ValidationError};

/// Turns a plaintext password into the stored hash. Provided by the auth layer.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    pub hashed_password: String,
}

impl User {
    pub fn new(create: UserCreate, hasher: &dyn PasswordHasher) -> Result<Self, ValidationError> {
        let create = check(create)?;
        check(Self {
            id: Uuid::new_v4(),
            hashed_password: hasher.hash(&create.password),
            email: create.email,
            is_active: create.is_active,
            is_superuser: create.is_superuser,
            full_name: create.full_name,
        })
    }

    /// Applies a patch that has already passed its own constraints.
    pub fn apply(&mut self, update: UserUpdate, hasher: &dyn PasswordHasher) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(is_superuser) = update.is_superuser {
            self.is_superuser = is_superuser;
        }
        if let Some(full_name) = update.full_name {
            self.full_name = full_name;
        }
        if let Some(password) = update.password {
            self.hashed_password = hasher.hash(&password);
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("email", self.email.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[validate(length(min = 8, max = 40))]
    pub password: String,
}

/// Self sign-up payload; cannot set account flags.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserRegister {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 40))]
    pub password: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
}

impl From<UserRegister> for UserCreate {
    fn from(register: UserRegister) -> Self {
        Self {
            email: register.email,
            is_active: true,
            is_superuser: false,
            full_name: register.full_name,
            password: register.password,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    /// `Some(None)` clears the name.
    #[serde(
        default,
        deserialize_with = "crate::models::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 255))]
    pub full_name: Option<Option<String>>,
    #[validate(length(min = 8, max = 40))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdateMe {
    #[serde(
        default,
        deserialize_with = "crate::models::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 255))]
    pub full_name: Option<Option<String>>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
}

impl From<UserUpdateMe> for UserUpdate {
    fn from(update: UserUpdateMe) -> Self {
        Self {
            email: update.email,
            full_name: update.full_name,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            full_name: user.full_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersPublic {
    pub data: Vec<UserPublic>,
    pub count: usize,
}
