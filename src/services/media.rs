//! Media presentation helpers
//!
//! Detail responses present an entity's images and videos as one ordered
//! strip (images first), and the lightbox state machine that pages through
//! that strip lives here so its wrap-around behavior can be tested in
//! isolation.

use serde::Serialize;

use crate::models::MediaKind;

/// One entry in a combined media strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaEntry {
    pub url: String,
    pub kind: MediaKind,
}

/// Combine image and video URL lists into a single ordered strip,
/// images first, preserving order within each list.
pub fn combined_media(images: &[String], videos: &[String]) -> Vec<MediaEntry> {
    let mut entries = Vec::with_capacity(images.len() + videos.len());
    for url in images {
        entries.push(MediaEntry {
            url: url.clone(),
            kind: MediaKind::Image,
        });
    }
    for url in videos {
        entries.push(MediaEntry {
            url: url.clone(),
            kind: MediaKind::Video,
        });
    }
    entries
}

/// Lightbox viewer state over a strip of `len` media entries.
///
/// Navigation wraps around at both ends; every operation on an empty
/// strip leaves the lightbox closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lightbox {
    Closed,
    Open { index: usize },
}

impl Lightbox {
    /// Open at the given index, clamped into range. Empty strips stay closed.
    pub fn open_at(len: usize, index: usize) -> Self {
        if len == 0 {
            Lightbox::Closed
        } else {
            Lightbox::Open {
                index: index.min(len - 1),
            }
        }
    }

    /// Advance to the next entry, wrapping past the end.
    pub fn next(self, len: usize) -> Self {
        match self {
            Lightbox::Open { index } if len > 0 => Lightbox::Open {
                index: (index + 1) % len,
            },
            _ => Lightbox::Closed,
        }
    }

    /// Step back to the previous entry, wrapping past the start.
    pub fn prev(self, len: usize) -> Self {
        match self {
            Lightbox::Open { index } if len > 0 => Lightbox::Open {
                index: (index + len - 1) % len,
            },
            _ => Lightbox::Closed,
        }
    }

    pub fn close(self) -> Self {
        Lightbox::Closed
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Lightbox::Open { index } => Some(*index),
            Lightbox::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_combined_media_images_first() {
        let images = vec!["/a.jpg".to_string(), "/b.jpg".to_string()];
        let videos = vec!["/c.mp4".to_string()];
        let strip = combined_media(&images, &videos);
        assert_eq!(strip.len(), 3);
        assert_eq!(strip[0].kind, MediaKind::Image);
        assert_eq!(strip[1].url, "/b.jpg");
        assert_eq!(strip[2].kind, MediaKind::Video);
    }

    #[test]
    fn test_open_on_empty_strip_stays_closed() {
        assert_eq!(Lightbox::open_at(0, 0), Lightbox::Closed);
        assert_eq!(Lightbox::open_at(0, 5), Lightbox::Closed);
    }

    #[test]
    fn test_open_clamps_out_of_range_index() {
        assert_eq!(Lightbox::open_at(3, 10), Lightbox::Open { index: 2 });
    }

    #[test]
    fn test_navigation_wraps() {
        let len = 3;
        let lb = Lightbox::open_at(len, 2);
        assert_eq!(lb.next(len).index(), Some(0));
        let lb = Lightbox::open_at(len, 0);
        assert_eq!(lb.prev(len).index(), Some(2));
    }

    #[test]
    fn test_close() {
        assert_eq!(Lightbox::open_at(3, 1).close(), Lightbox::Closed);
        assert_eq!(Lightbox::Closed.next(3), Lightbox::Closed);
    }

    proptest! {
        #[test]
        fn prop_index_stays_in_bounds(len in 1usize..32, start in 0usize..64, steps in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut lb = Lightbox::open_at(len, start);
            for forward in steps {
                lb = if forward { lb.next(len) } else { lb.prev(len) };
                let index = lb.index().unwrap();
                prop_assert!(index < len);
            }
        }

        #[test]
        fn prop_next_then_prev_is_identity(len in 1usize..32, start in 0usize..32) {
            let lb = Lightbox::open_at(len, start);
            prop_assert_eq!(lb.next(len).prev(len), lb);
            prop_assert_eq!(lb.prev(len).next(len), lb);
        }

        #[test]
        fn prop_full_cycle_returns_to_start(len in 1usize..16, start in 0usize..16) {
            let mut lb = Lightbox::open_at(len, start);
            let origin = lb;
            for _ in 0..len {
                lb = lb.next(len);
            }
            prop_assert_eq!(lb, origin);
        }
    }
}
