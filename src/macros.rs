/// Defines a string-like newtype with a `new` constructor and a `Deref` to the wrapped type.
///
/// Extra associated items may follow the type inside an `impl { ... }` block.
macro_rules! new_type {
    (
        $(#[$attr:meta])*
        $name:ident($type:ty)
        $(impl {
            $($item:tt)*
        })?
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name($type);
        impl $name {
            #[doc = concat!("Wraps the given `", stringify!($type), "` in a `", stringify!($name), "`.")]
            pub const fn new(value: $type) -> Self {
                $name(value)
            }
            $($($item)*)?
        }
        impl std::ops::Deref for $name {
            type Target = $type;
            fn deref(&self) -> &$type {
                &self.0
            }
        }
        impl From<$name> for $type {
            fn from(value: $name) -> $type {
                value.0
            }
        }
    };
}

/// Defines a newtype around an absolute [`url::Url`] that also keeps the string it was parsed
/// from, so that comparisons and serialization use exactly what the caller supplied.
macro_rules! new_url_type {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Clone)]
        pub struct $name(url::Url, String);
        impl $name {
            #[doc = concat!("Parses `url` into a `", stringify!($name), "`.")]
            pub fn new(url: String) -> Result<Self, url::ParseError> {
                Ok($name(url::Url::parse(&url)?, url))
            }
            #[doc = concat!("Wraps an already parsed `Url` in a `", stringify!($name), "`.")]
            pub fn from_url(url: url::Url) -> Self {
                let raw = url.to_string();
                $name(url, raw)
            }
            /// Parsed form of the URL.
            pub fn url(&self) -> &url::Url {
                &self.0
            }
        }
        impl std::ops::Deref for $name {
            type Target = String;
            fn deref(&self) -> &String {
                &self.1
            }
        }
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.1).finish()
            }
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str(&self.1)
            }
        }
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.1 == other.1
            }
        }
        impl Eq for $name {}
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.1)
            }
        }
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                $name::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}
