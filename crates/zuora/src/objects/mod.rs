//! Concrete Zuora object types.
//!
//! Each type is a thin wrapper around a [`Record`](zuora_core::Record) of its
//! schema with typed accessors. Setters go through
//! [`Record::assign`](zuora_core::Record::assign), so they coerce, mark the
//! field dirty and chain.

/// Declare a record type wrapping a [`Record`](zuora_core::Record) of `$schema`.
macro_rules! record_type {
    ($(#[$meta:meta])* $name:ident => $schema:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            record: ::zuora_core::Record,
        }

        impl ::zuora_core::Model for $name {
            fn schema() -> &'static ::zuora_core::Schema {
                $schema()
            }

            fn from_record(record: ::zuora_core::Record) -> Self {
                debug_assert_eq!(record.type_name(), $schema().name());
                Self { record }
            }

            fn record(&self) -> &::zuora_core::Record {
                &self.record
            }

            fn record_mut(&mut self) -> &mut ::zuora_core::Record {
                &mut self.record
            }

            fn into_record(self) -> ::zuora_core::Record {
                self.record
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as ::zuora_core::Model>::build()
            }
        }
    };
}

/// Typed getter/setter pairs.
///
/// `getter / setter: kind => "field"`, where kind picks the getter's return
/// type: `text`, `integer`, `boolean`, `date`, `datetime` or `raw`.
macro_rules! accessors {
    ($($get:ident / $set:ident : $kind:ident => $field:literal;)*) => {
        $(
            accessors!(@get $get, $kind, $field);

            pub fn $set(&mut self, value: impl Into<::zuora_core::Value>) -> &mut Self {
                self.record.assign($field, value);
                self
            }
        )*
    };
    (@get $get:ident, text, $field:literal) => {
        #[must_use]
        pub fn $get(&self) -> Option<&str> {
            self.record.value($field).as_str()
        }
    };
    (@get $get:ident, integer, $field:literal) => {
        #[must_use]
        pub fn $get(&self) -> Option<i64> {
            self.record.value($field).as_i64()
        }
    };
    (@get $get:ident, boolean, $field:literal) => {
        #[must_use]
        pub fn $get(&self) -> Option<bool> {
            self.record.value($field).as_bool()
        }
    };
    (@get $get:ident, date, $field:literal) => {
        #[must_use]
        pub fn $get(&self) -> Option<::chrono::NaiveDate> {
            self.record.value($field).as_date()
        }
    };
    (@get $get:ident, datetime, $field:literal) => {
        #[must_use]
        pub fn $get(&self) -> Option<&::chrono::DateTime<::chrono::FixedOffset>> {
            self.record.value($field).as_datetime()
        }
    };
    (@get $get:ident, raw, $field:literal) => {
        #[must_use]
        pub fn $get(&self) -> &::zuora_core::Value {
            self.record.value($field)
        }
    };
}

/// Getters for read-only fields; there is nothing to set.
macro_rules! readers {
    ($($get:ident : $kind:ident => $field:literal;)*) => {
        $( accessors!(@get $get, $kind, $field); )*
    };
}

mod account;
mod amendment;
mod product_rate_plan;
mod subscription;

pub use account::Account;
pub use amendment::Amendment;
pub use product_rate_plan::ProductRatePlan;
pub use subscription::Subscription;
