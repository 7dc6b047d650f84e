//! Request bodies exchanged with the cinema resource.

use serde::{Deserialize, Serialize};

use crate::domain::{CinemaFields, CinemaRecord};

/// Body of `POST {base}`. The store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCinemaRequest {
    pub movie: String,
    pub description: String,
    pub image: String,
}

impl From<CinemaFields> for CreateCinemaRequest {
    fn from(value: CinemaFields) -> Self {
        Self {
            movie: value.movie,
            description: value.description,
            image: value.image,
        }
    }
}

impl From<CreateCinemaRequest> for CinemaFields {
    fn from(value: CreateCinemaRequest) -> Self {
        Self {
            movie: value.movie,
            description: value.description,
            image: value.image,
        }
    }
}

/// Body of `PUT {base}/{id}`: the full record, identifier included.
pub type UpdateCinemaRequest = CinemaRecord;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_has_no_identifier() {
        let body = CreateCinemaRequest::from(CinemaFields::new("Dune", "Sci-fi", "http://x/d.jpg"));
        let value = serde_json::to_value(&body).expect("encode");
        assert_eq!(
            value,
            serde_json::json!({
                "movie": "Dune",
                "description": "Sci-fi",
                "image": "http://x/d.jpg",
            })
        );
    }
}
