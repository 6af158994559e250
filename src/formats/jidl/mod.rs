//! JADN interface definition language (JIDL)
//!
//! One declaration per line: metadata (`key: json`), type definitions
//! (`Name = TypeExpr // description`) and the fields or items of the current
//! type. Printing aligns columns using [`JidlStyle`] widths.

pub mod typestr;

use super::{SchemaReader, SchemaWriter};
use crate::config::{style_as, Style};
use crate::core_type::CoreType;
use crate::error::{Error, GrammarError, Result};
use crate::model::{FieldDef, ItemDef, Meta, Schema, TypeDef};
use crate::options::{OptionScope, OptionTable, OptionValue, Options, MAX_UNBOUNDED};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use typestr::TagRef;

static META_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([-\w]+):\s*(.+?)\s*$").unwrap());

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(?:[^"\\]|\\.)+""#).unwrap());

static TYPE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\S+)\s*=\s*(.*?)\s*\{?$").unwrap());

static ITEM_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(.*?)\s*$").unwrap());

static FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s+(\S+)\s*(.*?)(?:\s+(?:\[([.*\w]+)\]|(optional)))?\s*$").unwrap()
});

static ID_FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s*(.*?)(?:\s+(?:\[([.*\w]+)\]|(optional)))?\s*$").unwrap()
});

static MULTIPLICITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)(?:\.\.(\d+|\*))?$").unwrap());

static WRAPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(Link|Key)\((.*)\)$").unwrap());

static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^:]+)::\s*(.*)$").unwrap());

/// The `jidl` format
#[derive(Debug, Clone, Copy)]
pub struct JidlFormat;

/// Column widths of the printed notation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JidlStyle {
    /// Width of the metadata key column
    pub meta: usize,
    /// Width of the field id column
    pub id: usize,
    /// Width of the field name column
    pub name: usize,
    /// Width of the field type column
    #[serde(rename = "type")]
    pub type_: usize,
    /// Fixed description column, overriding the type-dependent default
    pub desc: Option<usize>,
    /// Truncate lines to this width
    pub page: Option<usize>,
}

impl Default for JidlStyle {
    fn default() -> Self {
        Self {
            meta: 12,
            id: 4,
            name: 16,
            type_: 35,
            desc: Some(50),
            page: None,
        }
    }
}

impl SchemaReader for JidlFormat {
    fn loads(&self, table: &OptionTable, text: &str) -> Result<Schema> {
        loads(table, text)
    }
}

impl SchemaWriter for JidlFormat {
    fn default_style(&self) -> Style {
        match serde_json::to_value(JidlStyle::default()) {
            Ok(Value::Object(style)) => style,
            _ => Style::new(),
        }
    }

    fn dumps(&self, table: &OptionTable, schema: &Schema, style: &Style) -> Result<String> {
        let style: JidlStyle = style_as(style)?;
        Ok(dumps(table, schema, &style))
    }
}

/// A type whose field list is still open, with unresolved tagids
struct OpenType {
    typedef: TypeDef,
    tagids: Vec<(usize, TagRef, usize)>,
}

impl OpenType {
    /// Resolve sibling-name tagids to field ids
    fn close(mut self) -> Result<TypeDef> {
        for (index, tagref, line) in std::mem::take(&mut self.tagids) {
            let id = match tagref {
                TagRef::Id(id) => id,
                TagRef::Name(name) => self
                    .typedef
                    .field_by_name(&name)
                    .map(|f| i64::from(f.id))
                    .ok_or_else(|| {
                        Error::Reference(format!(
                            "line {}: TagId[{}] names no field of '{}'",
                            line, name, self.typedef.name
                        ))
                    })?,
            };
            self.typedef.fields[index]
                .options
                .insert("tagid".to_string(), OptionValue::Int(id));
        }
        Ok(self.typedef)
    }
}

/// Parse JIDL text
pub fn loads(table: &OptionTable, text: &str) -> Result<Schema> {
    let mut meta = Meta::new();
    let mut types: Vec<TypeDef> = Vec::new();
    let mut current: Option<OpenType> = None;

    for (index, line) in text.lines().enumerate() {
        let lineno = index + 1;
        let grammar = |message: String| -> Error {
            GrammarError::new(message)
                .with_line(lineno)
                .with_text(line.trim_end())
                .into()
        };

        let code = line.split("//").next().unwrap_or_default();
        if code.trim().is_empty() {
            continue;
        }

        if let Some(m) = META_LINE.captures(line) {
            if current.is_some() || !types.is_empty() {
                return Err(grammar("metadata after type definitions".to_string()));
            }
            let value: Value = serde_json::from_str(&m[2])
                .map_err(|e| grammar(format!("invalid metadata value: {}", e)))?;
            meta.insert(&m[1], value);
            continue;
        }

        let (code, desc) = split_description(line);

        if let Some(m) = TYPE_LINE.captures(code) {
            if let Some(open) = current.take() {
                types.push(open.close()?);
            }
            let expr = typestr::parse(table, &m[2]).map_err(&grammar)?;
            if expr.has_field_options() {
                return Err(grammar("field options are not allowed in a type definition".to_string()));
            }
            let core_type = CoreType::parse(&expr.name)
                .ok_or_else(|| grammar(format!("unknown core type '{}'", expr.name)))?;
            let mut typedef = TypeDef::new(&m[1], core_type).with_description(desc);
            typedef.options = expr.options;
            tracing::trace!(name = %typedef.name, line = lineno, "type definition");
            current = Some(OpenType {
                typedef,
                tagids: Vec::new(),
            });
            continue;
        }

        if code.trim() == "}" {
            continue;
        }

        let open = current
            .as_mut()
            .ok_or_else(|| grammar("field with no type".to_string()))?;

        if open.typedef.core_type.has_items() {
            let m = ITEM_LINE
                .captures(code)
                .ok_or_else(|| grammar("expected an item: id value".to_string()))?;
            let id = parse_id(&m[1]).map_err(&grammar)?;
            let (value, description) = take_label(&m[2], desc, open.typedef.is_id_typed());
            open.typedef
                .items
                .push(ItemDef::new(id, value).with_description(description));
        } else if open.typedef.core_type.has_fields() {
            let id_typed = open.typedef.is_id_typed();
            let (id, name, fstr, mult) = if id_typed {
                let m = ID_FIELD_LINE
                    .captures(code)
                    .ok_or_else(|| grammar("expected a field: id type".to_string()))?;
                (m[1].to_string(), String::new(), m[2].to_string(), multiplicity_group(&m, 3))
            } else {
                let m = FIELD_LINE
                    .captures(code)
                    .ok_or_else(|| grammar("expected a field: id name type".to_string()))?;
                (m[1].to_string(), m[2].to_string(), m[3].to_string(), multiplicity_group(&m, 4))
            };
            if fstr.is_empty() {
                return Err(grammar("field with no type".to_string()));
            }
            let id = parse_id(&id).map_err(&grammar)?;
            let (field, tagid) = parse_field(table, id, &name, &fstr, mult.as_deref(), desc, id_typed)
                .map_err(&grammar)?;
            if let Some(tagref) = tagid {
                open.tagids.push((open.typedef.fields.len(), tagref, lineno));
            }
            open.typedef.fields.push(field);
        } else {
            return Err(grammar(format!(
                "{} type '{}' cannot have fields",
                open.typedef.core_type, open.typedef.name
            )));
        }
    }

    if let Some(open) = current.take() {
        types.push(open.close()?);
    }
    Schema::new(meta, types)
}

/// Split a line into code and description at the first ` //` not inside the first quoted string
fn split_description(line: &str) -> (&str, String) {
    let comment = line.find(" //");
    let start = match (QUOTED.find(line), comment) {
        (Some(q), Some(c)) if q.start() < c => q.end(),
        _ => 0,
    };
    match line[start..].find(" //") {
        Some(d) => {
            let at = start + d;
            (line[..at].trim(), line[at + 3..].trim().to_string())
        }
        None => (line.trim(), String::new()),
    }
}

fn multiplicity_group(m: &regex::Captures<'_>, group: usize) -> Option<String> {
    if m.get(group + 1).is_some() {
        Some("0..1".to_string())
    } else {
        m.get(group).map(|g| g.as_str().to_string())
    }
}

fn parse_id(text: &str) -> std::result::Result<u32, String> {
    text.parse::<u32>()
        .map_err(|_| format!("id {} is out of range", text))
}

/// Id-typed members carry their name as `label:: description`
fn take_label(name: &str, desc: String, id_typed: bool) -> (String, String) {
    if id_typed && name.is_empty() {
        if let Some(m) = LABEL.captures(&desc) {
            return (m[1].to_string(), m[2].to_string());
        }
    }
    (name.to_string(), desc)
}

fn parse_field(
    table: &OptionTable,
    id: u32,
    name: &str,
    fstr: &str,
    mult: Option<&str>,
    desc: String,
    id_typed: bool,
) -> std::result::Result<(FieldDef, Option<TagRef>), String> {
    let mut options = Options::new();
    let mut fstr = fstr;
    let wrapped;
    if let Some(m) = WRAPPER.captures(fstr) {
        let marker = if &m[1] == "Key" { "key" } else { "link" };
        options.insert(marker.to_string(), OptionValue::Bool(true));
        wrapped = m[2].to_string();
        fstr = &wrapped;
    }

    let expr = typestr::parse(table, fstr)?;
    options.extend(expr.options);
    if expr.not {
        options.insert("not".to_string(), OptionValue::Bool(true));
    }

    let (name, dir) = match name.strip_suffix('/') {
        Some(n) => (n, true),
        None => (name, false),
    };
    if dir {
        options.insert("dir".to_string(), OptionValue::Bool(true));
    }

    if let Some(mult) = mult {
        let m = MULTIPLICITY
            .captures(mult)
            .ok_or_else(|| format!("invalid multiplicity [{}]", mult))?;
        let lo: i64 = m[1].parse().map_err(|_| format!("invalid multiplicity [{}]", mult))?;
        let hi = match m.get(2).map(|g| g.as_str()) {
            None => lo,
            Some("*") => MAX_UNBOUNDED,
            Some(n) => n.parse().map_err(|_| format!("invalid multiplicity [{}]", mult))?,
        };
        if lo != 1 {
            options.insert("minOccurs".to_string(), OptionValue::Int(lo));
        }
        if hi != 1 {
            options.insert("maxOccurs".to_string(), OptionValue::Int(hi));
        }
    }

    let (name, description) = take_label(name, desc, id_typed);
    let mut field = FieldDef::new(id, name, expr.name).with_description(description);
    field.options = options;
    Ok((field, expr.tagid))
}

/// Print a schema as JIDL
pub fn dumps(table: &OptionTable, schema: &Schema, style: &JidlStyle) -> String {
    let mut text = String::new();
    for (key, value) in schema.meta().ordered() {
        text.push_str(&format!("{:>w$}: {}\n", key, inline_json(value), w = style.meta));
    }

    let wt = style.desc.unwrap_or(style.id + style.name + style.type_);
    for td in schema.types() {
        let tdef = format!(
            "{} = {}",
            td.name,
            typestr::print(td.core_type.as_str(), &td.options, None)
        );
        let tdesc = describe(&td.description);
        let line = truncate(&format!("{:<wt$}{}", tdef, tdesc), style.page.map(|p| p.saturating_sub(1)));
        text.push('\n');
        text.push_str(line.trim_end());
        text.push('\n');

        let id_typed = td.is_id_typed();
        for item in &td.items {
            let (value, desc) = if id_typed {
                (String::new(), labeled(&item.value, &item.description))
            } else {
                (item.value.clone(), item.description.clone())
            };
            let fs = format!("{:>w$} {}", item.id, value, w = style.id);
            let wf = style.desc.unwrap_or(style.id + style.name + 2);
            push_member(&mut text, &fs, &describe(&desc), wf, style.page);
        }
        for field in &td.fields {
            let (fname, fdef, desc) = field_columns(table, td, field, id_typed);
            let wn = if id_typed { 0 } else { style.name };
            let fs = format!("{:>wi$} {:<wn$} {}", field.id, fname, fdef, wi = style.id);
            let wf = style
                .desc
                .unwrap_or(if id_typed { style.id + style.type_ } else { wt });
            push_member(&mut text, &fs, &describe(&desc), wf, style.page);
        }
    }
    text
}

fn push_member(text: &mut String, fs: &str, fdesc: &str, width: usize, page: Option<usize>) {
    let line = format!("{:<width$}{}", fs, fdesc);
    text.push_str(&etrunc(line.trim_end(), page));
    text.push('\n');
}

/// Carry an id-typed member's name in its description; unnamed members keep the description alone
fn labeled(name: &str, desc: &str) -> String {
    if name.is_empty() {
        desc.to_string()
    } else {
        format!("{}:: {}", name, desc)
    }
}

fn describe(desc: &str) -> String {
    if desc.is_empty() {
        String::new()
    } else {
        format!(" // {}", desc)
    }
}

/// Name, type expression with multiplicity, and description of a field
fn field_columns(table: &OptionTable, td: &TypeDef, field: &FieldDef, id_typed: bool) -> (String, String, String) {
    let (field_opts, type_opts): (Options, Options) = field
        .options
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .partition(|(k, _)| {
            table
                .by_name(k)
                .map_or(false, |d| d.scope == OptionScope::Field)
        });
    let flag = |name: &str| field_opts.get(name).and_then(OptionValue::as_bool) == Some(true);

    let (fname, desc) = if id_typed {
        (String::new(), labeled(&field.name, &field.description))
    } else {
        let dir = if flag("dir") { "/" } else { "" };
        (format!("{}{}", field.name, dir), field.description.clone())
    };

    let tagid = field_opts
        .get("tagid")
        .and_then(OptionValue::as_int)
        .map(|id| {
            u32::try_from(id)
                .ok()
                .and_then(|id| td.field_by_id(id))
                .map(|f| f.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| id.to_string())
        });
    let ft = typestr::print(&field.type_ref, &type_opts, tagid.as_deref());
    let mut fdef = if flag("key") {
        format!("Key({})", ft)
    } else if flag("link") {
        format!("Link({})", ft)
    } else if flag("not") {
        format!("!{}", ft)
    } else {
        ft
    };

    match multiplicity(field).as_str() {
        "1" => {}
        "0..1" => fdef.push_str(" optional"),
        m => fdef.push_str(&format!(" [{}]", m)),
    }
    (fname, fdef, desc)
}

fn multiplicity(field: &FieldDef) -> String {
    let lo = field.min_occurs();
    let hi = field.max_occurs();
    if hi >= 0 && hi == lo {
        hi.to_string()
    } else if hi <= MAX_UNBOUNDED {
        format!("{}..*", lo)
    } else {
        format!("{}..{}", lo, hi)
    }
}

/// Truncate to `n` characters, replacing the tail with `..`
fn etrunc(s: &str, n: Option<usize>) -> String {
    match n {
        None => s.to_string(),
        Some(n) if s.chars().count() <= n => s.to_string(),
        Some(n) if n > 1 => {
            let head: String = s.chars().take(n - 2).collect();
            head + ".."
        }
        Some(n) => s.chars().take(n).collect(),
    }
}

/// Plain truncation used for type lines
fn truncate(s: &str, n: Option<usize>) -> String {
    match n {
        Some(n) => s.chars().take(n).collect(),
        None => s.to_string(),
    }
}

/// Single-line JSON with a space after separators
fn inline_json(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(inline_json).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::from(k.as_str()), inline_json(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        scalar => scalar.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> &'static OptionTable {
        OptionTable::global().unwrap()
    }

    const SAMPLE: &str = r#"       title: "Music Library"
     package: "http://fake-audio.org/music-lib"
       roots: ["Library"]

Library = MapOf(Barcode, Album){1..*}              // Top level of the library is a map of CDs by barcode

Barcode = String{pattern="^\d{12}$"}               // A UPC-A barcode is 12 digits

Album = Record                                     // model for the album
   1 album_artist     Artist                       // primary artist associated with this album
   2 album_title      String                       // publicly known title for this album
   3 pub_data         Publication                  // metadata about the album's publication
   4 tracks           ArrayOf(Track){1..*}         // individual track descriptions
   5 cover_art        Image optional               // cover art image for this album

Publication = Record                               // who and when of publication
   1 label            String                       // name of record label
   2 rdate            String /date                 // date of release

Image = Record                                     // pool of possible image formats
   1 image_format     ImageFormat                  // type of image
   2 image_content    Binary                       // binary image

ImageFormat = Enumerated                           // can only be one, but can extend list
   1 PNG
   2 JPG
   3 GIF

Track = Array                                      // for each track there's a file with the audio and a metadata record
   1  TrackInfo                                    // info:: track information
   2  Audio                                        // audio::

Audio = Binary                                     // the audio file itself

TrackInfo = Record                                 // information about the individual audio tracks
   1 track_number     Integer=[1, *]               // track sequence number
   2 title            String                       // track title
   3 length           Integer=[1, *] /duration     // length of track in seconds
   4 featured         Artist unique [0..*]         // notable guest artists
   5 genre            Genre                        // type of music

Genre = Enumerated                                 // per wikipedia, there are 6 main genres
   1 jazz
   2 rock

Artist = Record                                    // interesting information about a performer
   1 artist_name      String                       // who is this person
   2 instruments      Instrument [1..*]            // and what do they play

Instrument = Enumerated                            // collection of instruments
   1 vocals
   2 guitar
"#;

    #[test]
    fn test_parse_sample() {
        let schema = loads(table(), SAMPLE).unwrap();
        assert_eq!(schema.meta().get_str("title"), Some("Music Library"));
        assert_eq!(schema.types().len(), 12);

        let album = schema.get_type("Album").unwrap();
        assert_eq!(album.fields.len(), 5);
        assert_eq!(album.fields[4].min_occurs(), 0);
        assert_eq!(album.fields[3].options["vtype"], OptionValue::Ref("Track".into()));

        let track = schema.get_type("Track").unwrap();
        assert_eq!(track.fields[0].name, "info");
        assert_eq!(track.fields[0].description, "track information");
        assert_eq!(track.fields[1].name, "audio");
        assert_eq!(track.fields[1].description, "");

        let barcode = schema.get_type("Barcode").unwrap();
        assert_eq!(barcode.options["pattern"], OptionValue::Text(r"^\d{12}$".into()));
    }

    #[test]
    fn test_print_is_stable() {
        let schema = loads(table(), SAMPLE).unwrap();
        let text = dumps(table(), &schema, &JidlStyle::default());
        assert_eq!(text, SAMPLE);
    }

    #[test]
    fn test_tagid_resolution() {
        let text = "Msg = Record\n   1 kind   Kind\n   2 body   Body(TagId[kind])\n";
        let schema = loads(table(), text).unwrap();
        let msg = schema.get_type("Msg").unwrap();
        assert_eq!(msg.fields[1].options["tagid"], OptionValue::Int(1));
        assert!(dumps(table(), &schema, &JidlStyle::default()).contains("Body(TagId[kind])"));

        let bad = "Msg = Record\n   1 kind   Kind\n   2 body   Body(TagId[nope])\n";
        assert!(matches!(loads(table(), bad), Err(Error::Reference(_))));
    }

    #[test]
    fn test_field_markers() {
        let text = "Rec = Record\n   1 owner/ Key(Person)\n   2 ref  Link(Doc) [0..3]\n   3 x !Foo\n";
        let schema = loads(table(), text).unwrap();
        let rec = schema.get_type("Rec").unwrap();
        assert_eq!(rec.fields[0].name, "owner");
        assert!(rec.fields[0].has_flag("dir"));
        assert!(rec.fields[0].has_flag("key"));
        assert!(rec.fields[1].has_flag("link"));
        assert_eq!((rec.fields[1].min_occurs(), rec.fields[1].max_occurs()), (0, 3));
        assert!(rec.fields[2].has_flag("not"));
    }

    #[test]
    fn test_grammar_errors_carry_line() {
        let err = loads(table(), "title: \"x\"\n   1 a String\n").unwrap_err();
        match err {
            Error::Grammar(g) => assert_eq!(g.line, Some(2)),
            other => panic!("unexpected {:?}", other),
        }

        let err = loads(table(), "A = Record\n   1 a\n").unwrap_err();
        assert!(matches!(err, Error::Grammar(_)));

        let err = loads(table(), "A = Record\n   1 a String [x..y]\n").unwrap_err();
        assert!(matches!(err, Error::Grammar(_)));

        let err = loads(table(), "A = Widget\n").unwrap_err();
        assert!(matches!(err, Error::Grammar(_)));

        let err = loads(table(), "A = Record\ntitle: \"late\"\n").unwrap_err();
        assert!(matches!(err, Error::Grammar(_)));
    }

    #[test]
    fn test_description_with_quotes() {
        let (code, desc) = split_description(r#"A = String{pattern="^//x$"} // say "hi""#);
        assert_eq!(code, r#"A = String{pattern="^//x$"}"#);
        assert_eq!(desc, r#"say "hi""#);

        let (code, desc) = split_description(r#"   1 a String // a "quoted" word"#);
        assert_eq!(code, "1 a String");
        assert_eq!(desc, r#"a "quoted" word"#);
    }

    #[test]
    fn test_unnamed_id_typed_members_keep_descriptions() {
        let text = "Pair = Array\n   1  String                                       // just a description\n   2  Integer\n";
        let schema = loads(table(), text).unwrap();
        let pair = schema.get_type("Pair").unwrap();
        assert_eq!(pair.fields[0].name, "");
        assert_eq!(pair.fields[0].description, "just a description");
        assert_eq!(pair.fields[1].description, "");

        let printed = dumps(table(), &schema, &JidlStyle::default());
        assert_eq!(printed, format!("\n{}", text));
        assert_eq!(loads(table(), &printed).unwrap(), schema);
    }

    #[test]
    fn test_page_truncation() {
        assert_eq!(etrunc("abcdefgh", Some(6)), "abcd..");
        assert_eq!(etrunc("abc", Some(6)), "abc");
        assert_eq!(etrunc("abc", None), "abc");
    }
}
