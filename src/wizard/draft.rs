use crate::session::Role;

/// Values typed into the wizard so far. Lives only as long as the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub user_type: Role,
    /// Reference to an already-uploaded photo.
    pub profile_photo: Option<String>,
}

impl FormDraft {
    /// First and last name joined for the backend's single `name` field.
    pub fn full_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => String::new(),
        }
    }

    /// Merge one field. No validation happens here.
    pub fn apply(&mut self, update: DraftUpdate) {
        match update {
            DraftUpdate::Email(value) => self.email = value,
            DraftUpdate::Password(value) => self.password = value,
            DraftUpdate::FirstName(value) => self.first_name = value,
            DraftUpdate::LastName(value) => self.last_name = value,
            DraftUpdate::Phone(value) => self.phone = value,
            DraftUpdate::UserType(role) => self.user_type = role,
            DraftUpdate::ProfilePhoto(photo) => self.profile_photo = photo,
        }
    }
}

/// A single-field change to a [`FormDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftUpdate {
    Email(String),
    Password(String),
    FirstName(String),
    LastName(String),
    Phone(String),
    UserType(Role),
    ProfilePhoto(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_touches_only_the_named_field() {
        let mut draft = FormDraft {
            email: "amina@ryfty.test".into(),
            ..FormDraft::default()
        };
        draft.apply(DraftUpdate::FirstName("Amina".into()));
        draft.apply(DraftUpdate::UserType(Role::Provider));
        assert_eq!(draft.email, "amina@ryfty.test");
        assert_eq!(draft.first_name, "Amina");
        assert_eq!(draft.user_type, Role::Provider);
        assert!(draft.password.is_empty());
    }

    #[test]
    fn full_name_skips_blank_parts() {
        let mut draft = FormDraft::default();
        assert_eq!(draft.full_name(), "");
        draft.last_name = " Okafor ".into();
        assert_eq!(draft.full_name(), "Okafor");
        draft.first_name = "Amina".into();
        assert_eq!(draft.full_name(), "Amina Okafor");
    }
}
