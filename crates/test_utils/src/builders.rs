//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else. Names and addresses left unset are random.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{OwnerId, PropertyId};
use domain_identity::{NewUser, PasswordHasher};
use domain_property::{CreateProperty, NewProperty, Owner, OwnerProfile, Property};
use fake::faker::address::en::StreetName;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::TemporalFixtures;

/// Builder for owners
pub struct OwnerBuilder {
    id: OwnerId,
    name: String,
    address: Option<String>,
    photo: String,
    birthday: NaiveDate,
    is_active: bool,
    now: DateTime<Utc>,
}

impl Default for OwnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnerBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: OwnerId::new(1),
            name: Name().fake(),
            address: Some(StreetName().fake()),
            photo: String::new(),
            birthday: TemporalFixtures::birthday(),
            is_active: true,
            now: TemporalFixtures::now(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = OwnerId::new(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn without_address(mut self) -> Self {
        self.address = None;
        self
    }

    /// Sets the photo data URL
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = photo.into();
        self
    }

    pub fn with_birthday(mut self, birthday: NaiveDate) -> Self {
        self.birthday = birthday;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Builds the owner
    pub fn build(self) -> Owner {
        let mut owner = Owner::new(
            self.id,
            &self.name,
            self.address.as_deref(),
            self.birthday,
            self.now,
        );
        owner.photo = self.photo;
        owner.is_active = self.is_active;
        owner
    }

    /// Builds an inline profile carrying the same fields
    pub fn build_profile(self) -> OwnerProfile {
        OwnerProfile {
            name: Some(self.name),
            address: self.address,
            photo: (!self.photo.is_empty()).then_some(self.photo),
            birthday: Some(self.birthday),
        }
    }
}

/// Builder for properties
pub struct PropertyBuilder {
    id: PropertyId,
    name: String,
    address: String,
    price: Decimal,
    code_internal: String,
    year: i32,
    owner_id: OwnerId,
    is_active: bool,
    now: DateTime<Utc>,
}

impl Default for PropertyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: PropertyId::new(1),
            name: format!("Casa {}", LastName().fake::<String>()),
            address: StreetName().fake(),
            price: dec!(250000),
            code_internal: "PR-001".to_string(),
            year: 2000,
            owner_id: OwnerId::new(1),
            is_active: true,
            now: TemporalFixtures::now(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = PropertyId::new(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code_internal = code.into();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn with_owner(mut self, owner_id: i64) -> Self {
        self.owner_id = OwnerId::new(owner_id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    fn new_property(&self) -> NewProperty {
        NewProperty {
            name: self.name.clone(),
            address: self.address.clone(),
            price: self.price,
            code_internal: self.code_internal.clone(),
            year: self.year,
            owner_id: self.owner_id,
        }
    }

    /// Builds the property, discarding its creation trace
    pub fn build(self) -> Property {
        let (mut property, _) = Property::create(self.id, self.new_property(), self.now);
        property.is_active = self.is_active;
        property
    }

    /// Builds a creation request for an existing owner
    pub fn build_request(self) -> CreateProperty {
        CreateProperty {
            name: self.name,
            address: self.address,
            price: self.price,
            code_internal: self.code_internal,
            year: self.year,
            id_owner: self.owner_id,
            owner: None,
        }
    }
}

/// Builder for users about to be stored
pub struct NewUserBuilder {
    username: String,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    roles: Vec<String>,
}

impl Default for NewUserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewUserBuilder {
    /// Creates a new builder with random identity fields and the User role
    pub fn new() -> Self {
        Self {
            username: Username().fake(),
            email: SafeEmail().fake(),
            password: "secret123".to_string(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            roles: vec![domain_identity::user::USER_ROLE.to_string()],
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the plain-text password; it is hashed on build
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn build(self) -> NewUser {
        NewUser {
            username: self.username,
            email: self.email,
            password_hash: PasswordHasher::hash(&self.password),
            first_name: self.first_name,
            last_name: self.last_name,
            roles: self.roles,
        }
    }
}
