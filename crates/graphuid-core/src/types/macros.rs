//! Declarative helpers shared by the element types.

/// A string newtype naming a label or a relationship type.
macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap a name.
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// The name as text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// A store-allocated numeric id.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw id.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw id.
            #[must_use]
            pub const fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

/// Builder and accessor methods over a `properties` map field.
macro_rules! property_methods {
    ($ty:ty) => {
        impl $ty {
            /// Builder form of [`Self::set_property`].
            #[must_use]
            pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
                self.set_property(key, value);
                self
            }

            /// Read a property.
            #[must_use]
            pub fn get_property(&self, key: &str) -> Option<&Value> {
                self.properties.get(key)
            }

            /// Insert or overwrite a property.
            pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
                self.properties.insert(key.into(), value.into());
            }

            /// Drop a property, handing back what it held.
            pub fn remove_property(&mut self, key: &str) -> Option<Value> {
                self.properties.remove(key)
            }
        }
    };
}
