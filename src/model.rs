//! User records and the editable draft used by the form.
//!
use serde::{Deserialize, Serialize};

/// Identifier of a user record. Server assigned for fetched users,
/// synthesized locally (max + 1) for created ones.
pub type UserId = u64;

/// A user record as served by the remote collection.
///
/// Fields beyond these five (address, company, ...) are ignored on decode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Form field selectors for the draft.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Username,
    Email,
    Phone,
}

impl DraftField {
    /// Fields in form order.
    pub const ALL: [DraftField; 4] = [
        DraftField::Name,
        DraftField::Username,
        DraftField::Email,
        DraftField::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Name => "Name",
            DraftField::Username => "Username",
            DraftField::Email => "Email",
            DraftField::Phone => "Phone",
        }
    }

    /// Next field in form order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            DraftField::Name => DraftField::Username,
            DraftField::Username => DraftField::Email,
            DraftField::Email => DraftField::Phone,
            DraftField::Phone => DraftField::Name,
        }
    }

    /// Previous field in form order, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            DraftField::Name => DraftField::Phone,
            DraftField::Username => DraftField::Name,
            DraftField::Email => DraftField::Username,
            DraftField::Phone => DraftField::Email,
        }
    }
}

/// The not-yet-committed copy of a user being created or edited.
///
/// `id` is only set while editing an existing record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub id: Option<UserId>,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
}

impl Draft {
    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Username => &self.username,
            DraftField::Email => &self.email,
            DraftField::Phone => &self.phone,
        }
    }

    pub fn field_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Name => &mut self.name,
            DraftField::Username => &mut self.username,
            DraftField::Email => &mut self.email,
            DraftField::Phone => &mut self.phone,
        }
    }

    /// Build a committed record from this draft under the given id.
    pub fn to_user(&self, id: UserId) -> User {
        User {
            id,
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

impl From<&User> for Draft {
    fn from(user: &User) -> Self {
        Self {
            id: Some(user.id),
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}
