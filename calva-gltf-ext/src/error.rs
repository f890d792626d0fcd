use thiserror::Error;

use crate::extensions::Target;

#[derive(Debug, Error)]
pub enum Error {
    /// `path` is the dotted location of the offending value, empty when the
    /// fragment itself is malformed.
    #[error("{extension}: {}{source}", at(.path))]
    Schema {
        extension: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{extension}: missing required field `{field}`")]
    MissingField {
        extension: &'static str,
        field: String,
    },

    #[error("{extension}: {kind} `{id}` does not exist in the document")]
    DanglingReference {
        extension: &'static str,
        kind: &'static str,
        id: String,
    },

    #[error("handler for {expected} was given a {actual} extension")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("no handler for extension {name} on {target:?}")]
    UnknownExtension { name: String, target: Target },

    #[error("extension {name} is required but not supported")]
    RequiredExtension { name: String },

    #[error("duplicate id `{id}`")]
    DuplicateId { id: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn schema(extension: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Schema {
            extension,
            path: String::new(),
            source,
        }
    }
}

fn at(path: &str) -> String {
    match path {
        "" => String::new(),
        path => format!("at `{path}`: "),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn error_display() {
    let e = Error::MissingField {
        extension: "KHR_lights_punctual",
        field: "lights[0].spot.innerConeAngle".into(),
    };
    assert!(e.to_string().contains("KHR_lights_punctual"));
    assert!(e.to_string().contains("lights[0].spot.innerConeAngle"));

    let e = Error::DanglingReference {
        extension: "KHR_lights_punctual",
        kind: "light",
        id: "7".into(),
    };
    assert!(e.to_string().contains("`7`"));
}

#[test]
fn schema_error_names_extension() {
    let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
    let e = Error::schema("KHR_texture_transform")(source);
    assert!(matches!(
        e,
        Error::Schema {
            extension: "KHR_texture_transform",
            ..
        }
    ));
    assert!(e.to_string().starts_with("KHR_texture_transform: "));
}
