//! Recognizing sentences and cutting them into fields.

use arrayvec::ArrayVec;
use std::slice;

use crate::err::ParseError;

/// Talker prefixes that are accepted: GPS only and combined GNSS.
pub const TALKER_PREFIXES: [&str; 2] = ["$GP", "$GN"];
/// Fields of a sentence are separated by this character.
pub const DELIMITER: char = ',';
/// Most fields a sentence is ever split into.
pub const MAX_FIELDS: usize = 20;

/// The sentence types the acquisition understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
    /// `GGA`, global positioning system fix data.
    Position,
    /// `RMC`, recommended minimum data, used for its date and time.
    TimeDate,
}

/// Fields with a fixed meaning in at least one sentence kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Time,
    Status,
    Latitude,
    LatitudeQuadrant,
    Longitude,
    LongitudeQuadrant,
    FixQuality,
    Satellites,
    Altitude,
    Date,
}

impl SentenceKind {
    fn from_id(id: &[u8]) -> Option<Self> {
        match id {
            b"GGA" => Some(SentenceKind::Position),
            b"RMC" => Some(SentenceKind::TimeDate),
            _ => None,
        }
    }

    /// The three letter sentence identifier.
    pub fn id(self) -> &'static str {
        match self {
            SentenceKind::Position => "GGA",
            SentenceKind::TimeDate => "RMC",
        }
    }

    /// Number of fields (including the header) a sentence needs before
    /// any of its content is trusted.
    pub fn min_fields(self) -> usize {
        match self {
            SentenceKind::Position => 7,
            SentenceKind::TimeDate => 10,
        }
    }

    /// Position of `field` within a sentence of this kind.
    pub fn index_of(self, field: Field) -> Option<usize> {
        use self::Field::*;

        let index = match (self, field) {
            (_, Time) => 1,
            (SentenceKind::Position, Latitude) => 2,
            (SentenceKind::Position, LatitudeQuadrant) => 3,
            (SentenceKind::Position, Longitude) => 4,
            (SentenceKind::Position, LongitudeQuadrant) => 5,
            (SentenceKind::Position, FixQuality) => 6,
            (SentenceKind::Position, Satellites) => 7,
            (SentenceKind::Position, Altitude) => 9,
            (SentenceKind::TimeDate, Status) => 2,
            (SentenceKind::TimeDate, Latitude) => 3,
            (SentenceKind::TimeDate, LatitudeQuadrant) => 4,
            (SentenceKind::TimeDate, Longitude) => 5,
            (SentenceKind::TimeDate, LongitudeQuadrant) => 6,
            (SentenceKind::TimeDate, Date) => 9,
            _ => return None,
        };
        Some(index)
    }
}

/// Determine the kind of `line` from its first six characters.
/// Returns `None` for every talker or sentence type that is not understood.
pub fn classify(line: &str) -> Option<SentenceKind> {
    let bytes = line.as_bytes();
    if bytes.len() < 6 {
        return None;
    }

    let (talker, rest) = bytes.split_at(3);
    if !TALKER_PREFIXES.iter().any(|p| p.as_bytes() == talker) {
        return None;
    }
    SentenceKind::from_id(&rest[..3])
}

/// The fields of one sentence, in order. The first field is the header,
/// e.g. `$GPGGA`.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceFields<'a> {
    fields: ArrayVec<&'a str, MAX_FIELDS>,
}

impl<'a> SentenceFields<'a> {
    /// Number of fields populated, always at least 1.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).cloned()
    }

    /// Look up a named field of a sentence of kind `kind`.
    pub fn field(&self, kind: SentenceKind, field: Field) -> Option<&'a str> {
        kind.index_of(field).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> slice::Iter<&'a str> {
        self.fields.iter()
    }
}

/// Split `line` at every `DELIMITER` into at most `max_fields` fields.
///
/// Once `max_fields - 1` fields are cut, the last field holds the remainder
/// of the line, delimiters included. A line without a delimiter is a single
/// field.
pub fn split(line: &str, max_fields: usize) -> Result<SentenceFields, ParseError> {
    if max_fields == 0 || max_fields > MAX_FIELDS {
        return Err(ParseError::FieldCapacity(max_fields, MAX_FIELDS));
    }

    let mut fields: ArrayVec<&str, MAX_FIELDS> = ArrayVec::new();
    let mut rest = line;
    while fields.len() + 1 < max_fields {
        match rest.find(DELIMITER) {
            Some(pos) => {
                fields.push(&rest[..pos]);
                rest = &rest[pos + DELIMITER.len_utf8()..];
            }
            None => break,
        }
    }
    fields
        .try_push(rest)
        .map_err(|_| ParseError::FieldCapacity(max_fields, MAX_FIELDS))?;

    Ok(SentenceFields { fields })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";

    #[test]
    fn classify_known_sentences() {
        assert_eq!(classify(GGA), Some(SentenceKind::Position));
        assert_eq!(classify("$GNGGA,"), Some(SentenceKind::Position));
        assert_eq!(
            classify("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W"),
            Some(SentenceKind::TimeDate)
        );
        assert_eq!(classify("$GNRMC"), Some(SentenceKind::TimeDate));
    }

    #[test]
    fn classify_rejects_everything_else() {
        assert_eq!(classify("$GLGGA,123519"), None);
        assert_eq!(classify("$GPGSV,3,1,11"), None);
        assert_eq!(classify("$gpgga,123519"), None);
        assert_eq!(classify("GPGGA,123519"), None);
        assert_eq!(classify("$GPGG"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn split_gga() {
        let fields = split(GGA, MAX_FIELDS).unwrap();
        assert_eq!(fields.len(), 15);
        assert_eq!(fields.get(0), Some("$GPGGA"));
        assert_eq!(fields.get(2), Some("4807.038"));
        assert_eq!(fields.get(13), Some(""));
        assert_eq!(fields.get(14), Some(""));
        assert_eq!(fields.get(15), None);

        let kind = SentenceKind::Position;
        assert_eq!(fields.field(kind, Field::Latitude), Some("4807.038"));
        assert_eq!(fields.field(kind, Field::LatitudeQuadrant), Some("N"));
        assert_eq!(fields.field(kind, Field::Longitude), Some("01131.000"));
        assert_eq!(fields.field(kind, Field::LongitudeQuadrant), Some("E"));
        assert_eq!(fields.field(kind, Field::Satellites), Some("08"));
        assert_eq!(fields.field(kind, Field::Altitude), Some("545.4"));
        assert_eq!(fields.field(kind, Field::Date), None);
    }

    #[test]
    fn split_stops_at_max_fields() {
        let fields = split(GGA, 3).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get(0), Some("$GPGGA"));
        assert_eq!(fields.get(1), Some("123519"));
        assert_eq!(
            fields.get(2),
            Some("4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,")
        );

        let fields = split(GGA, 1).unwrap();
        assert_eq!(fields.iter().cloned().collect::<Vec<_>>(), vec![GGA]);
    }

    #[test]
    fn split_without_delimiter() {
        let fields = split("$GPTXT", MAX_FIELDS).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get(0), Some("$GPTXT"));

        let fields = split("", MAX_FIELDS).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(!fields.is_empty());
    }

    #[test]
    fn split_rejects_bad_capacity() {
        assert_matches!(split(GGA, 0), Err(ParseError::FieldCapacity(0, MAX_FIELDS)));
        assert_matches!(split(GGA, 21), Err(ParseError::FieldCapacity(21, MAX_FIELDS)));
    }

    #[test]
    fn rmc_field_positions() {
        let rmc = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W";
        let fields = split(rmc, MAX_FIELDS).unwrap();
        let kind = SentenceKind::TimeDate;
        assert!(fields.len() >= kind.min_fields());
        assert_eq!(fields.field(kind, Field::Time), Some("123519"));
        assert_eq!(fields.field(kind, Field::Status), Some("A"));
        assert_eq!(fields.field(kind, Field::Date), Some("230394"));
        assert_eq!(fields.field(kind, Field::Satellites), None);
    }
}
