//! Index-facing views of the three library entity kinds. The domain module
//! owning the full entities is elsewhere; these carry only the key and the
//! text metadata that search cares about.

use crate::indexer::Indexable;
use crate::posting::EntityKey;
use crate::text::strip_tags;

/// An individual musician or band.
pub struct Artist {
    key: EntityKey,
    pub name: String,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: EntityKey::new("Artist", format!("artist:{name}")),
            name,
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }
}

impl Indexable for Artist {
    fn key(&self) -> &EntityKey {
        &self.key
    }

    fn indexable_fields(&self) -> Vec<(String, String)> {
        vec![("name".to_owned(), self.name.clone())]
    }
}

/// An album in the library, either single-artist or a compilation.
pub struct Album {
    key: EntityKey,
    pub title: String,
    album_artist: Option<String>,
    is_compilation: bool,
}

impl Album {
    pub fn new(album_id: u64, title: impl Into<String>, album_artist: impl Into<String>) -> Self {
        Self {
            key: EntityKey::new("Album", format!("a:{album_id:x}")),
            title: title.into(),
            album_artist: Some(album_artist.into()),
            is_compilation: false,
        }
    }

    /// A compilation gathers tracks by many different artists. Its synthetic
    /// various-artists label is not real artist text and is never indexed.
    pub fn compilation(album_id: u64, title: impl Into<String>) -> Self {
        Self {
            key: EntityKey::new("Album", format!("a:{album_id:x}")),
            title: title.into(),
            album_artist: None,
            is_compilation: true,
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn is_compilation(&self) -> bool {
        self.is_compilation
    }

    /// The artist name worth indexing, if any.
    pub fn artist_name(&self) -> Option<&str> {
        if self.is_compilation {
            None
        } else {
            self.album_artist.as_deref()
        }
    }
}

impl Indexable for Album {
    fn key(&self) -> &EntityKey {
        &self.key
    }

    fn indexable_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("title".to_owned(), strip_tags(&self.title))];
        if let Some(artist) = self.artist_name() {
            fields.push(("artist".to_owned(), artist.to_owned()));
        }
        fields
    }
}

/// A track on an album. Carries denormalized album text so that searches
/// for an album title also surface its tracks.
pub struct Track {
    key: EntityKey,
    pub title: String,
    album_title: String,
    album_artist: Option<String>,
    track_artist: Option<String>,
}

impl Track {
    pub fn new(ufid: &str, album: &Album, title: impl Into<String>) -> Self {
        Self {
            key: EntityKey::new("Track", format!("t:{ufid}")),
            title: title.into(),
            album_title: album.title.clone(),
            album_artist: album.artist_name().map(str::to_owned),
            track_artist: None,
        }
    }

    /// Set the track's own artist. Compilation tracks need this; tracks on
    /// single-artist albums fall back to the album artist without it.
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.track_artist = Some(artist.into());
        self
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn artist_name(&self) -> Option<&str> {
        self.track_artist.as_deref().or(self.album_artist.as_deref())
    }
}

impl Indexable for Track {
    fn key(&self) -> &EntityKey {
        &self.key
    }

    fn indexable_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("title".to_owned(), strip_tags(&self.title)),
            ("album".to_owned(), strip_tags(&self.album_title)),
        ];
        if let Some(artist) = self.artist_name() {
            fields.push(("artist".to_owned(), artist.to_owned()));
        }
        fields
    }
}
