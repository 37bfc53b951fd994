use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four identifier schemes the Google Books API reports for a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierKind {
    #[serde(rename = "ISBN_10")]
    Isbn10,
    #[serde(rename = "ISBN_13")]
    Isbn13,
    #[serde(rename = "ISSN")]
    Issn,
    #[serde(rename = "OTHER")]
    Other,
}

impl IdentifierKind {
    /// Every kind, in form/display order.
    pub const ALL: [IdentifierKind; 4] = [Self::Isbn10, Self::Isbn13, Self::Issn, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Isbn10 => "ISBN_10",
            Self::Isbn13 => "ISBN_13",
            Self::Issn => "ISSN",
            Self::Other => "OTHER",
        }
    }

    /// Map an API type string onto a kind; anything unrecognized is `Other`.
    pub fn from_api(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ISBN_10" => Ok(Self::Isbn10),
            "ISBN_13" => Ok(Self::Isbn13),
            "ISSN" => Ok(Self::Issn),
            "OTHER" => Ok(Self::Other),
            other => Err(format!("unknown identifier kind: {other}")),
        }
    }
}

/// One identifier row: a (kind, value) pair owned by a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub id: i64,
    pub book_id: i64,
    pub kind: IdentifierKind,
    pub value: String,
}

impl Identifier {
    /// Human-readable form, e.g. `"ISBN_13: 9788307018867"`.
    pub fn display(&self) -> String {
        format!("{}: {}", self.kind, self.value)
    }
}

/// One optional value per identifier kind, as submitted by the edit form.
///
/// A fixed record instead of a kind→value map: callers walk
/// [`IdentifierKind::ALL`] and ask for each slot, so a kind can never be
/// supplied twice. Blank submissions count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSet {
    pub isbn_10: Option<String>,
    pub isbn_13: Option<String>,
    pub issn: Option<String>,
    pub other: Option<String>,
}

impl IdentifierSet {
    pub fn get(&self, kind: IdentifierKind) -> Option<&str> {
        let slot = match kind {
            IdentifierKind::Isbn10 => &self.isbn_10,
            IdentifierKind::Isbn13 => &self.isbn_13,
            IdentifierKind::Issn => &self.issn,
            IdentifierKind::Other => &self.other,
        };
        slot.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn set(&mut self, kind: IdentifierKind, value: impl Into<String>) {
        let slot = match kind {
            IdentifierKind::Isbn10 => &mut self.isbn_10,
            IdentifierKind::Isbn13 => &mut self.isbn_13,
            IdentifierKind::Issn => &mut self.issn,
            IdentifierKind::Other => &mut self.other,
        };
        *slot = Some(value.into());
    }

    pub fn is_empty(&self) -> bool {
        IdentifierKind::ALL.iter().all(|&k| self.get(k).is_none())
    }

    /// The supplied (kind, value) pairs, in `ALL` order.
    pub fn entries(&self) -> Vec<(IdentifierKind, &str)> {
        IdentifierKind::ALL
            .iter()
            .filter_map(|&k| self.get(k).map(|v| (k, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_wire_name() {
        for kind in IdentifierKind::ALL {
            assert_eq!(kind.as_str().parse::<IdentifierKind>(), Ok(kind));
        }
        assert!("ISBN10".parse::<IdentifierKind>().is_err());
    }

    #[test]
    fn unknown_api_type_maps_to_other() {
        assert_eq!(IdentifierKind::from_api("ISBN_13"), IdentifierKind::Isbn13);
        assert_eq!(IdentifierKind::from_api("LCCN"), IdentifierKind::Other);
    }

    #[test]
    fn set_blank_values_count_as_absent() {
        let set = IdentifierSet {
            isbn_10: Some("  ".to_string()),
            isbn_13: Some("9788307018867".to_string()),
            ..Default::default()
        };
        assert!(!set.is_empty());
        assert_eq!(set.get(IdentifierKind::Isbn10), None);
        assert_eq!(
            set.entries(),
            vec![(IdentifierKind::Isbn13, "9788307018867")]
        );
        assert!(IdentifierSet::default().is_empty());
    }

    #[test]
    fn identifier_display_format() {
        let ident = Identifier {
            id: 1,
            book_id: 7,
            kind: IdentifierKind::Isbn13,
            value: "9788307018867".to_string(),
        };
        assert_eq!(ident.display(), "ISBN_13: 9788307018867");
    }
}
