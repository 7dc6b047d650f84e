use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{UnknownFieldError, ValidationError};

/// Store-assigned identifier of a cinema record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CinemaId(pub String);

impl CinemaId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CinemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CinemaField {
    Movie,
    Description,
    Image,
}

impl CinemaField {
    pub const ALL: [CinemaField; 3] = [
        CinemaField::Movie,
        CinemaField::Description,
        CinemaField::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CinemaField::Movie => "movie",
            CinemaField::Description => "description",
            CinemaField::Image => "image",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CinemaField::Movie => "Movie Name",
            CinemaField::Description => "Description",
            CinemaField::Image => "Image URL",
        }
    }
}

impl fmt::Display for CinemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CinemaField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(CinemaField::Movie),
            "description" => Ok(CinemaField::Description),
            "image" => Ok(CinemaField::Image),
            other => Err(UnknownFieldError(other.to_string())),
        }
    }
}

/// The user-editable content of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinemaFields {
    pub movie: String,
    pub description: String,
    pub image: String,
}

impl CinemaFields {
    pub fn new(
        movie: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            movie: movie.into(),
            description: description.into(),
            image: image.into(),
        }
    }

    pub fn get(&self, field: CinemaField) -> &str {
        match field {
            CinemaField::Movie => &self.movie,
            CinemaField::Description => &self.description,
            CinemaField::Image => &self.image,
        }
    }

    pub fn get_mut(&mut self, field: CinemaField) -> &mut String {
        match field {
            CinemaField::Movie => &mut self.movie,
            CinemaField::Description => &mut self.description,
            CinemaField::Image => &mut self.image,
        }
    }

    pub fn set(&mut self, field: CinemaField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// True when nothing has been typed into any field.
    pub fn is_blank(&self) -> bool {
        CinemaField::ALL
            .iter()
            .all(|field| self.get(*field).is_empty())
    }

    pub fn missing_fields(&self) -> Vec<CinemaField> {
        CinemaField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    /// Only the empty string counts as missing; whitespace is accepted as typed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinemaRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: CinemaId,
    pub movie: String,
    pub description: String,
    pub image: String,
}

impl CinemaRecord {
    pub fn from_parts(id: CinemaId, fields: CinemaFields) -> Self {
        Self {
            id,
            movie: fields.movie,
            description: fields.description,
            image: fields.image,
        }
    }

    pub fn fields(&self) -> CinemaFields {
        CinemaFields {
            movie: self.movie.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
        }
    }
}
