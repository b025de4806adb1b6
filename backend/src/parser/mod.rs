//! CSV point parser with encoding and delimiter auto-detection.
//!
//! Reads tables with the columns `Name, X, Y, Z` (exact, case-sensitive;
//! other columns are ignored) into [`Point`]s. Coordinates must be numeric;
//! a decimal comma is accepted when the delimiter is not a comma.

use std::io::{Read, Write};
use std::path::Path;

use crate::models::Point;

/// Columns every input table must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Name", "X", "Y", "Z"];

/// CSV parsing error with context
#[derive(Debug, Clone, PartialEq)]
pub struct CsvError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.line, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.line, col, self.message)
            }
            _ => {
                write!(f, "Line {}: {}", self.line, self.message)
            }
        }
    }
}

impl std::error::Error for CsvError {}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Parsed points with detection metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Points in file order
    pub points: Vec<Point>,
    /// Detected encoding label
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// All column headers, including ignored ones
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
///
/// Always returns a label `encoding_rs` understands.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) || std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0.to_lowercase();

    // Normalize charset names
    let label = match charset.as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8",
        "windows-1251" | "cp1251" => "windows-1251",
        "koi8-r" => cyrillic_codepage(bytes, "koi8-r"),
        "maccyrillic" | "x-mac-cyrillic" | "ibm866" | "cp866" | "ibm855" | "iso-8859-5" => {
            cyrillic_codepage(bytes, "windows-1251")
        }
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1",
        "windows-1252" | "cp1252" => "windows-1252",
        other => {
            return match encoding_rs::Encoding::for_label(other.as_bytes()) {
                Some(_) => other.to_string(),
                None => "windows-1252".to_string(),
            };
        }
    };
    label.to_string()
}

/// Pick between cp1251 and KOI8-R for text chardet called Cyrillic.
///
/// chardet often confuses the two with the DOS and Mac code pages on short
/// inputs. Both place the alphabet in 0xC0..=0xFF but swap the cases:
/// cp1251 lowercase is 0xE0..=0xFF, KOI8-R lowercase is 0xC0..=0xDF.
/// Names are mostly lowercase, so the busier half wins; ties go to `fallback`.
fn cyrillic_codepage(bytes: &[u8], fallback: &'static str) -> &'static str {
    let upper_half = bytes.iter().filter(|&&b| b >= 0xE0).count();
    let lower_half = bytes.iter().filter(|&&b| (0xC0..0xE0).contains(&b)).count();
    match upper_half.cmp(&lower_half) {
        std::cmp::Ordering::Greater => "windows-1251",
        std::cmp::Ordering::Less => "koi8-r",
        std::cmp::Ordering::Equal => fallback,
    }
}

/// Decode bytes to string using the specified encoding label.
///
/// Unknown labels fall back to lossy UTF-8; [`detect_encoding`] never
/// produces one. A byte order mark is stripped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let encoding = encoding_rs::Encoding::for_label(encoding.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    encoding.decode(bytes).0.into_owned()
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse a coordinate, accepting a decimal comma unless `,` is the delimiter.
fn parse_coordinate(raw: &str, delimiter: char) -> Option<f64> {
    let value = raw.trim();
    let parsed = value.parse::<f64>().ok().or_else(|| {
        if delimiter != ',' && value.contains(',') {
            value.replace(',', ".").parse::<f64>().ok()
        } else {
            None
        }
    })?;
    parsed.is_finite().then_some(parsed)
}

/// Parse CSV from a reader with an explicit delimiter.
pub fn parse_csv<R: Read>(reader: R, delimiter: char) -> Result<(Vec<String>, Vec<Point>), CsvError> {
    if !delimiter.is_ascii() {
        return Err(CsvError::new(0, format!("Unsupported delimiter '{}'", delimiter)));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| CsvError::new(1, format!("Cannot read header: {}", e)))?
        .iter()
        .map(|h| h.trim_matches('"').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::new(1, "Empty CSV file"));
    }

    let mut indices = [0usize; 4];
    let mut missing = Vec::new();
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        match headers.iter().position(|h| h == column) {
            Some(i) => *slot = i,
            None => missing.push(column),
        }
    }
    if !missing.is_empty() {
        return Err(CsvError::new(1, "Missing required columns (need Name, X, Y, Z)")
            .with_column(missing.join(", ")));
    }
    let [name_idx, x_idx, y_idx, z_idx] = indices;

    let mut points = Vec::new();
    for (row_idx, record) in rdr.records().enumerate() {
        let fallback_line = row_idx + 2; // +1 for 0-index, +1 for header
        let record = record.map_err(|e| CsvError::new(fallback_line, format!("Cannot read line: {}", e)))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let mut coords = [0.0f64; 3];
        for (slot, (idx, column)) in coords
            .iter_mut()
            .zip([(x_idx, "X"), (y_idx, "Y"), (z_idx, "Z")])
        {
            let raw = record.get(idx).unwrap_or("");
            if raw.is_empty() {
                return Err(CsvError::new(line, "Missing coordinate").with_column(column));
            }
            *slot = parse_coordinate(raw, delimiter).ok_or_else(|| {
                CsvError::new(line, "Not a finite number")
                    .with_column(column)
                    .with_value(raw)
            })?;
        }

        let name = record.get(name_idx).unwrap_or("").to_string();
        points.push(Point::new(name, coords[0], coords[1], coords[2]));
    }

    Ok((headers, points))
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> Result<ParseResult, CsvError> {
    let bytes = std::fs::read(path.as_ref())
        .map_err(|e| CsvError::new(0, format!("Cannot read file: {}", e)))?;

    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, CsvError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CsvError::new(1, "Empty CSV file"));
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let (headers, points) = parse_csv(content.as_bytes(), delimiter)?;
    Ok(ParseResult {
        points,
        encoding,
        delimiter,
        headers,
    })
}

/// Write points as `Name,X,Y,Z` CSV with full precision.
pub fn write_points_csv<W: Write>(writer: W, points: &[Point]) -> Result<(), CsvError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let io_err = |e: csv::Error| CsvError::new(0, format!("Cannot write CSV: {}", e));

    wtr.write_record(REQUIRED_COLUMNS).map_err(io_err)?;
    for p in points {
        wtr.write_record([p.name.clone(), p.x.to_string(), p.y.to_string(), p.z.to_string()])
            .map_err(io_err)?;
    }
    wtr.flush()
        .map_err(|e| CsvError::new(0, format!("Cannot write CSV: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> Result<ParseResult, CsvError> {
        parse_bytes_auto(csv.as_bytes())
    }

    #[test]
    fn test_simple_csv() {
        let result = parse("Name,X,Y,Z\nPoint1,1000.123,1500.234,500.345\nPoint2,2000.456,2500.567,1000.678").unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.points.len(), 2);
        assert_eq!(result.points[0], Point::new("Point1", 1000.123, 1500.234, 500.345));
        assert_eq!(result.points[1].name, "Point2");
    }

    #[test]
    fn test_semicolon_and_decimal_comma() {
        let result = parse("Name;X;Y;Z\nP1;10,5;20;30,25").unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.points[0], Point::new("P1", 10.5, 20.0, 30.25));
    }

    #[test]
    fn test_extra_columns_ignored_and_order_free() {
        let result = parse("Z,Comment,Name,Y,X\n3,hello,P1,2,1").unwrap();
        assert_eq!(result.points[0], Point::new("P1", 1.0, 2.0, 3.0));
        assert_eq!(result.headers, vec!["Z", "Comment", "Name", "Y", "X"]);
    }

    #[test]
    fn test_missing_columns() {
        let err = parse("Name,WrongCol1,WrongCol2\nPoint_A,1000,2000").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column.as_deref(), Some("X, Y, Z"));
    }

    #[test]
    fn test_column_names_case_sensitive() {
        assert!(parse("name,x,y,z\nP1,1,2,3").is_err());
    }

    #[test]
    fn test_non_numeric_value() {
        let err = parse("Name,X,Y,Z\nP1,1,2,3\nP2,abc,2,3").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.column.as_deref(), Some("X"));
        assert_eq!(err.value.as_deref(), Some("abc"));
    }

    #[test]
    fn test_missing_value() {
        let err = parse("Name;X;Y;Z\nP1;1;;3").unwrap_err();
        assert_eq!(err.column.as_deref(), Some("Y"));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        assert!(parse("Name,X,Y,Z\nP1,NaN,2,3").is_err());
        assert!(parse("Name,X,Y,Z\nP1,inf,2,3").is_err());
    }

    #[test]
    fn test_empty_lines_skipped() {
        let result = parse("Name,X,Y,Z\nP1,1,2,3\n\nP2,4,5,6\n").unwrap();
        assert_eq!(result.points.len(), 2);
    }

    #[test]
    fn test_header_only() {
        let result = parse("Name,X,Y,Z\n").unwrap();
        assert!(result.points.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let err = parse("").unwrap_err();
        assert!(err.message.contains("Empty"));
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Name,X,Y,Z\nТочка1,1,2,3".as_bytes());
        let result = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(result.headers[0], "Name");
        assert_eq!(result.points[0].name, "Точка1");
    }

    #[test]
    fn test_windows_1251_names() {
        let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode("Name;X;Y;Z\nРепер;1;2;3\nПункт;4;5;6\n");
        let decoded = decode_content(&encoded, "windows-1251");
        let (_, points) = parse_csv(decoded.as_bytes(), ';').unwrap();
        assert_eq!(points[0].name, "Репер");
        assert_eq!(points[1].name, "Пункт");
    }

    #[test]
    fn test_windows_1251_detected() {
        for text in [
            "Name;X;Y;Z\nРепер;1;2;3\nПункт;4;5;6\n",
            "Name,X,Y,Z\nРп1,1,2,3\nГрунтовый репер,4,5,6\n",
        ] {
            let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode(text);
            let result = parse_bytes_auto(&encoded).unwrap();
            assert_eq!(result.encoding, "windows-1251", "input {:?}", text);

            let expected: Vec<&str> = text.lines().skip(1).map(|l| l.split([';', ',']).next().unwrap()).collect();
            let names: Vec<&str> = result.points.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, expected);
        }
    }

    #[test]
    fn test_cyrillic_codepage_by_letter_case() {
        let (cp1251, _, _) = encoding_rs::WINDOWS_1251.encode("Грунтовый репер");
        assert_eq!(cyrillic_codepage(&cp1251, "koi8-r"), "windows-1251");

        let (koi8, _, _) = encoding_rs::KOI8_R.encode("Грунтовый репер");
        assert_eq!(cyrillic_codepage(&koi8, "windows-1251"), "koi8-r");

        assert_eq!(cyrillic_codepage(b"plain", "windows-1251"), "windows-1251");
    }

    #[test]
    fn test_detected_label_always_decodable() {
        let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode("Name;X;Y;Z\nТочка1;1;2;3\n");
        let label = detect_encoding(&encoded);
        assert!(encoding_rs::Encoding::for_label(label.as_bytes()).is_some(), "{}", label);
        assert!(!decode_content(&encoded, &label).contains('\u{FFFD}'));
    }

    #[test]
    fn test_quoted_values() {
        let result = parse("\"Name\",\"X\",\"Y\",\"Z\"\n\"P, one\",\"1.5\",\"2\",\"3\"").unwrap();
        assert_eq!(result.points[0].name, "P, one");
        assert_eq!(result.points[0].x, 1.5);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_error_message_format() {
        let err = CsvError::new(5, "Not a finite number")
            .with_column("X")
            .with_value("abc");

        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'X'"));
        assert!(msg.contains("value 'abc'"));
    }

    #[test]
    fn test_write_points_csv() {
        let mut buf = Vec::new();
        write_points_csv(&mut buf, &[Point::new("P1", 11.0, 22.5, -33.0)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Name,X,Y,Z\nP1,11,22.5,-33\n");

        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed.points[0], Point::new("P1", 11.0, 22.5, -33.0));
    }
}
