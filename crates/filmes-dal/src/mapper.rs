//! Field transcription between [`Movie`] and its views.
//!
//! Functions here never validate, callers validate views before mapping.

use crate::movie::{CreateMovie, Movie, ReadMovie, UpdateMovie};

pub fn to_read_view(movie: &Movie) -> ReadMovie {
    ReadMovie {
        title: movie.title.clone(),
        genre: movie.genre.clone(),
        duration: movie.duration,
    }
}

/// New entity with `id` 0, store assigns real one on insert
pub fn to_entity(view: CreateMovie) -> Movie {
    Movie {
        id: 0,
        title: view.title.unwrap_or_default(),
        genre: view.genre.unwrap_or_default(),
        duration: view.duration.unwrap_or_default(),
    }
}

pub fn apply_to_entity(view: UpdateMovie, movie: &mut Movie) {
    movie.title = view.title.unwrap_or_default();
    movie.genre = view.genre.unwrap_or_default();
    movie.duration = view.duration.unwrap_or_default();
}

pub fn to_update_view(movie: &Movie) -> UpdateMovie {
    UpdateMovie {
        title: Some(movie.title.clone()),
        genre: Some(movie.genre.clone()),
        duration: Some(movie.duration),
    }
}

impl From<&Movie> for ReadMovie {
    fn from(movie: &Movie) -> Self {
        to_read_view(movie)
    }
}

impl From<CreateMovie> for Movie {
    fn from(view: CreateMovie) -> Self {
        to_entity(view)
    }
}
