use std::collections::BTreeMap;

use super::{
    FieldValue, FormData, Rules,
    rules::{email, length, required, unique},
};
use crate::NewUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NewUserField {
    Name,
    Email,
    Role,
    SendWelcomeEmail,
}

impl FormData for NewUser {
    type Field = NewUserField;

    fn value(&self, field: NewUserField) -> FieldValue<'_> {
        match field {
            NewUserField::Name => FieldValue::Text(&self.name),
            NewUserField::Email => FieldValue::Text(&self.email),
            NewUserField::Role => FieldValue::Text(self.role.as_str()),
            NewUserField::SendWelcomeEmail => FieldValue::Flag(self.send_welcome_email),
        }
    }
}

/// Rules of the add-user form. `existing_emails` is captured, so rebuild the rules after
/// the collection changes.
pub fn new_user_rules(existing_emails: &[String]) -> Rules<NewUser> {
    BTreeMap::from([
        (
            NewUserField::Name,
            vec![required(None), length(2, 50, None)],
        ),
        (
            NewUserField::Email,
            vec![
                required(None),
                email(None),
                unique(existing_emails.to_vec(), None),
            ],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UserRole, validation::Validation};

    fn form(name: &str, email: &str) -> Validation<NewUser> {
        Validation::new(
            NewUser {
                name: name.to_owned(),
                email: email.to_owned(),
                role: UserRole::User,
                send_welcome_email: true,
            },
            new_user_rules(&["user1@example.com".to_owned()]),
        )
    }

    #[test]
    fn valid_draft_passes() {
        let mut form = form("Ann Lee", "ann@example.com");
        assert!(form.is_form_valid());
        assert!(form.validate_all());
        assert!(form.is_field_valid(NewUserField::Name));
        assert!(!form.is_field_valid(NewUserField::Role), "role has no rules");
    }

    #[test]
    fn each_email_rule_reports_in_order() {
        let mut empty = form("Ann", "");
        empty.validate_field(NewUserField::Email);
        assert_eq!(
            empty.error(NewUserField::Email),
            Some("This field is required")
        );

        let mut malformed = form("Ann", "ann@");
        malformed.validate_field(NewUserField::Email);
        assert_eq!(
            malformed.error(NewUserField::Email),
            Some("Invalid email format")
        );

        let mut taken = form("Ann", "user1@example.com");
        taken.validate_field(NewUserField::Email);
        assert_eq!(
            taken.error(NewUserField::Email),
            Some("This value is already in use")
        );
    }

    #[test]
    fn name_length_is_bounded() {
        let mut short = form("A", "a@b.co");
        assert!(!short.validate_field(NewUserField::Name));
        assert_eq!(
            short.error(NewUserField::Name),
            Some("Length must be between 2 and 50 characters")
        );

        let mut long = form(&"x".repeat(51), "a@b.co");
        assert!(!long.validate_field(NewUserField::Name));
    }
}
