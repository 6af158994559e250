//! Type expressions
//!
//! `Name[#][(args)]...[{pattern="re"}][=range][{lo..hi}][ /format][ flags]
//! [ extends(T)][ restricts(T)][ default(v)]`. The scanner walks the text
//! left to right; each construct maps to one or two type options.

use crate::options::{decode_payload, OptionTable, OptionValue, Options, MAX_UNBOUNDED};
use serde_json::Value;

/// Flag options printed as bare words, in print order
const FLAG_WORDS: [&str; 6] = ["unique", "set", "unordered", "sequence", "abstract", "final"];

/// Reference to a sibling field, before resolution
#[derive(Debug, Clone, PartialEq)]
pub enum TagRef {
    /// Already a field id
    Id(i64),
    /// Sibling field name
    Name(String),
}

/// A scanned type expression
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    /// Core type or referenced type name
    pub name: String,
    /// Type options
    pub options: Options,
    /// Leading `!`
    pub not: bool,
    /// `TagId[..]` argument
    pub tagid: Option<TagRef>,
}

impl TypeExpr {
    /// True if the expression carries field-only qualifiers
    pub fn has_field_options(&self) -> bool {
        self.not || self.tagid.is_some()
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|c: char| !f(c)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Text up to (not including) `close`, consuming the delimiter
    fn until(&mut self, close: char) -> Result<&'a str, String> {
        let rest = self.rest();
        let end = rest
            .find(close)
            .ok_or_else(|| format!("missing '{}' in \"{}\"", close, self.text))?;
        self.pos += end + close.len_utf8();
        Ok(&rest[..end])
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '$')
}

/// Scan a type expression
pub fn parse(table: &OptionTable, text: &str) -> Result<TypeExpr, String> {
    let mut s = Scanner { text, pos: 0 };
    s.skip_ws();
    let not = s.eat('!');
    let name = s.take_while(is_name_char).to_string();
    if name.is_empty() {
        return Err(format!("missing type name in \"{}\"", text));
    }

    let mut expr = TypeExpr {
        name,
        options: Options::new(),
        not,
        tagid: None,
    };
    if s.eat('#') {
        expr.options.insert("id".to_string(), OptionValue::Bool(true));
    }
    while s.eat('(') {
        let args = s.until(')')?;
        parse_args(&mut expr, args)?;
    }

    loop {
        s.skip_ws();
        let Some(c) = s.peek() else { break };
        match c {
            '{' => parse_brace(&mut s, &mut expr)?,
            '=' => {
                s.pos += 1;
                parse_range(table, &mut s, &mut expr)?;
            }
            '/' => {
                s.pos += 1;
                let format = s.take_while(|c| !c.is_whitespace());
                if format.is_empty() {
                    return Err(format!("empty format in \"{}\"", text));
                }
                set(&mut expr, "format", OptionValue::Text(format.to_string()))?;
            }
            _ => {
                let word = s.take_while(|c| c.is_ascii_alphabetic());
                match word {
                    w if FLAG_WORDS.contains(&w) => set(&mut expr, w, OptionValue::Bool(true))?,
                    "extends" | "restricts" => {
                        if !s.eat('(') {
                            return Err(format!("expected '(' after {}", word));
                        }
                        let target = s.until(')')?.trim();
                        if target.is_empty() {
                            return Err(format!("empty {} target", word));
                        }
                        set(&mut expr, word, OptionValue::Ref(target.to_string()))?;
                    }
                    "default" | "const" => {
                        if !s.eat('(') {
                            return Err(format!("expected '(' after {}", word));
                        }
                        let value = parse_json_arg(&mut s)?;
                        let decoded = value_from_json(table, word, &value, &expr.name)?;
                        set(&mut expr, word, decoded)?;
                    }
                    _ => {
                        return Err(format!(
                            "unexpected \"{}\" in type expression \"{}\"",
                            s.rest(),
                            text
                        ))
                    }
                }
            }
        }
    }
    Ok(expr)
}

fn set(expr: &mut TypeExpr, name: &str, value: OptionValue) -> Result<(), String> {
    if expr.options.insert(name.to_string(), value).is_some() {
        Err(format!("option '{}' given twice", name))
    } else {
        Ok(())
    }
}

/// One argument: a type name, or `Enum[T]` / `Pointer[T]` / `TagId[x]`
fn parse_arg(arg: &str) -> Result<(Option<&'static str>, String), String> {
    let arg = arg.trim();
    match arg.split_once('[') {
        Some((func, inner)) => {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| format!("unbalanced '[' in \"{}\"", arg))?
                .trim();
            let kind = match func.trim().to_ascii_lowercase().as_str() {
                "enum" => "enum",
                "pointer" => "pointer",
                "tagid" => "tagid",
                _ => return Err(format!("unexpected function \"{}\"", func)),
            };
            if inner.is_empty() {
                return Err(format!("empty argument in \"{}\"", arg));
            }
            Ok((Some(kind), inner.to_string()))
        }
        None if !arg.is_empty() && arg.chars().all(|c| is_name_char(c) || c == '!') => {
            Ok((None, arg.to_string()))
        }
        None => Err(format!("unexpected argument \"{}\"", arg)),
    }
}

/// `Enum[T]` and `Pointer[T]` become derived references `#T` and `>T`
fn derived_ref(kind: Option<&str>, name: String) -> Result<String, String> {
    match kind {
        None => Ok(name),
        Some("enum") => Ok(format!("#{}", name)),
        Some("pointer") => Ok(format!(">{}", name)),
        Some(other) => Err(format!("{} is not a type argument", other)),
    }
}

fn parse_args(expr: &mut TypeExpr, args: &str) -> Result<(), String> {
    let parts: Vec<&str> = args.splitn(2, ',').collect();
    let name = expr.name.clone();
    match name.as_str() {
        "MapOf" => {
            let [k, v] = parts.as_slice() else {
                return Err(format!("MapOf needs (key, value), found ({})", args));
            };
            let (kk, kn) = parse_arg(k)?;
            let (vk, vn) = parse_arg(v)?;
            set(expr, "ktype", OptionValue::Ref(derived_ref(kk, kn)?))?;
            set(expr, "vtype", OptionValue::Ref(derived_ref(vk, vn)?))
        }
        "ArrayOf" => {
            let (vk, vn) = parse_arg(args)?;
            set(expr, "vtype", OptionValue::Ref(derived_ref(vk, vn)?))
        }
        "Choice" if matches!(args.trim(), "anyOf" | "allOf" | "oneOf") => {
            let code = match args.trim() {
                "anyOf" => "O",
                "allOf" => "A",
                _ => "X",
            };
            set(expr, "combine", OptionValue::Text(code.to_string()))
        }
        _ => match parse_arg(args)? {
            (Some("enum"), name) => set(expr, "enum", OptionValue::Ref(name)),
            (Some("pointer"), name) => set(expr, "pointer", OptionValue::Ref(name)),
            (Some(_), target) => {
                if expr.tagid.is_some() {
                    return Err("TagId given twice".to_string());
                }
                expr.tagid = Some(match target.parse::<i64>() {
                    Ok(id) => TagRef::Id(id),
                    Err(_) => TagRef::Name(target),
                });
                Ok(())
            }
            (None, other) => Err(format!("unexpected argument \"{}\" for {}", other, expr.name)),
        },
    }
}

fn parse_brace(s: &mut Scanner<'_>, expr: &mut TypeExpr) -> Result<(), String> {
    const PATTERN_OPEN: &str = "{pattern=\"";
    if s.rest().starts_with(PATTERN_OPEN) {
        s.pos += PATTERN_OPEN.len();
        let rest = s.rest();
        // The pattern ends at a closing `"}` followed by the end of the expression or another construct
        let end = rest
            .match_indices("\"}")
            .map(|(i, _)| i)
            .find(|&i| {
                let after = &rest[i + 2..];
                after.is_empty() || after.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '=')
            })
            .ok_or_else(|| format!("unterminated pattern in \"{}\"", s.text))?;
        let pattern = rest[..end].to_string();
        s.pos += end + 2;
        return set(expr, "pattern", OptionValue::Text(pattern));
    }

    s.pos += 1;
    let body = s.until('}')?;
    let (lo, hi) = body
        .split_once("..")
        .ok_or_else(|| format!("unrecognized \"{{{}}}\", expected pattern or range", body))?;
    let (lo, hi) = (lo.trim(), hi.trim());
    if lo != "*" {
        let min = parse_int(lo)?;
        if min != 0 {
            set(expr, "minLength", OptionValue::Int(min))?;
        }
    }
    if hi != "*" {
        let max = parse_int(hi)?;
        if max != MAX_UNBOUNDED {
            set(expr, "maxLength", OptionValue::Int(max))?;
        }
    }
    Ok(())
}

fn parse_int(text: &str) -> Result<i64, String> {
    text.parse::<i64>()
        .map_err(|_| format!("\"{}\" is not an integer", text))
}

/// `=c`, `=[lo, hi]`, `=(lo, hi)` and mixed brackets; `*` leaves an end open
fn parse_range(table: &OptionTable, s: &mut Scanner<'_>, expr: &mut TypeExpr) -> Result<(), String> {
    s.skip_ws();
    let open = s.peek();
    if !matches!(open, Some('[') | Some('(')) {
        let token = s.take_while(|c| !c.is_whitespace() && c != '{');
        let value = bound(table, "const", token, &expr.name)?;
        return set(expr, "const", value);
    }
    s.pos += 1;
    let body = s.take_while(|c| c != ']' && c != ')');
    let close = s.peek();
    s.pos += 1;
    if close.is_none() {
        return Err(format!("unterminated range in \"{}\"", s.text));
    }

    let (lo, hi) = match body.split_once(',') {
        Some((lo, hi)) => (lo.trim(), hi.trim()),
        None => (body.trim(), body.trim()),
    };
    if lo != "*" {
        let name = if open == Some('(') { "minExclusive" } else { "minInclusive" };
        let value = bound(table, name, lo, &expr.name)?;
        set(expr, name, value)?;
    }
    if hi != "*" {
        let name = if close == Some(')') { "maxExclusive" } else { "maxInclusive" };
        let value = bound(table, name, hi, &expr.name)?;
        set(expr, name, value)?;
    }
    Ok(())
}

fn bound(table: &OptionTable, option: &str, payload: &str, context: &str) -> Result<OptionValue, String> {
    let def = table
        .by_name(option)
        .ok_or_else(|| format!("unknown option '{}'", option))?;
    decode_payload(def, payload, context).map_err(|e| e.to_string())
}

fn parse_json_arg(s: &mut Scanner<'_>) -> Result<Value, String> {
    let mut stream = serde_json::Deserializer::from_str(s.rest()).into_iter::<Value>();
    let value = match stream.next() {
        Some(Ok(v)) => v,
        Some(Err(e)) => return Err(format!("invalid value: {}", e)),
        None => return Err("missing value".to_string()),
    };
    s.pos += stream.byte_offset();
    s.skip_ws();
    if !s.eat(')') {
        return Err(format!("expected ')' in \"{}\"", s.text));
    }
    Ok(value)
}

fn value_from_json(table: &OptionTable, option: &str, value: &Value, context: &str) -> Result<OptionValue, String> {
    let payload = match value {
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        other => return Err(format!("unsupported {} value {}", option, other)),
    };
    bound(table, option, &payload, context)
}

fn ref_arg(value: &OptionValue) -> String {
    let name = value.to_string();
    if let Some(n) = name.strip_prefix('#') {
        format!("Enum[{}]", n)
    } else if let Some(n) = name.strip_prefix('>') {
        format!("Pointer[{}]", n)
    } else {
        name
    }
}

/// Print a type expression from a name and its type options
pub fn print(name: &str, options: &Options, tagid: Option<&str>) -> String {
    let mut txt = String::from(name);
    if options.contains_key("id") {
        txt.push('#');
    }

    match (options.get("ktype"), options.get("vtype")) {
        (Some(k), Some(v)) if name == "MapOf" => {
            txt.push_str(&format!("({}, {})", ref_arg(k), ref_arg(v)));
        }
        (_, Some(v)) if name == "ArrayOf" => txt.push_str(&format!("({})", ref_arg(v))),
        _ => {}
    }
    if let Some(code) = options.get("combine").and_then(OptionValue::as_str) {
        let word = match code {
            "O" => "anyOf",
            "A" => "allOf",
            _ => "oneOf",
        };
        txt.push_str(&format!("({})", word));
    }
    if let Some(v) = options.get("enum") {
        txt.push_str(&format!("(Enum[{}])", v));
    }
    if let Some(v) = options.get("pointer") {
        txt.push_str(&format!("(Pointer[{}])", v));
    }
    if let Some(label) = tagid {
        txt.push_str(&format!("(TagId[{}])", label));
    }
    if let Some(v) = options.get("pattern") {
        txt.push_str(&format!("{{pattern=\"{}\"}}", v));
    }

    let min = options.get("minInclusive").or_else(|| options.get("minExclusive"));
    let max = options.get("maxInclusive").or_else(|| options.get("maxExclusive"));
    if min.is_some() || max.is_some() {
        let lc = if options.contains_key("minExclusive") { '(' } else { '[' };
        let hc = if options.contains_key("maxExclusive") { ')' } else { ']' };
        let lo = min.map_or_else(|| "*".to_string(), |v| v.to_string());
        let hi = max.map_or_else(|| "*".to_string(), |v| v.to_string());
        txt.push_str(&format!("={}{}, {}{}", lc, lo, hi, hc));
    }
    let numeric_const = match options.get("const") {
        Some(v @ (OptionValue::Int(_) | OptionValue::Float(_))) => {
            txt.push_str(&format!("={}", v));
            true
        }
        _ => false,
    };

    let lo = options.get("minLength").and_then(OptionValue::as_int).unwrap_or(0);
    let hi = options
        .get("maxLength")
        .and_then(OptionValue::as_int)
        .unwrap_or(MAX_UNBOUNDED);
    if lo != 0 || hi != MAX_UNBOUNDED {
        let hs = if hi == MAX_UNBOUNDED { "*".to_string() } else { hi.to_string() };
        txt.push_str(&format!("{{{}..{}}}", lo, hs));
    }

    if let Some(v) = options.get("format") {
        txt.push_str(&format!(" /{}", v));
    }
    for flag in FLAG_WORDS {
        if options.get(flag).and_then(OptionValue::as_bool) == Some(true) {
            txt.push(' ');
            txt.push_str(flag);
        }
    }
    for attr in ["extends", "restricts"] {
        if let Some(v) = options.get(attr) {
            txt.push_str(&format!(" {}({})", attr, v));
        }
    }
    if let Some(v) = options.get("default") {
        txt.push_str(&format!(" default({})", v.to_json()));
    }
    if !numeric_const {
        if let Some(v) = options.get("const") {
            txt.push_str(&format!(" const({})", v.to_json()));
        }
    }
    txt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static OptionTable {
        OptionTable::global().unwrap()
    }

    fn scan(text: &str) -> TypeExpr {
        parse(table(), text).unwrap()
    }

    #[test]
    fn test_plain_name() {
        let e = scan("Person");
        assert_eq!(e.name, "Person");
        assert!(e.options.is_empty());
        assert!(!e.has_field_options());
    }

    #[test]
    fn test_containers() {
        let e = scan("MapOf(Enum[Color], Integer){1..*}");
        assert_eq!(e.options["ktype"], OptionValue::Ref("#Color".into()));
        assert_eq!(e.options["vtype"], OptionValue::Ref("Integer".into()));
        assert_eq!(e.options["minLength"], OptionValue::Int(1));
        assert!(!e.options.contains_key("maxLength"));

        let e = scan("ArrayOf(Pointer[Doc]){0..10} unique");
        assert_eq!(e.options["vtype"], OptionValue::Ref(">Doc".into()));
        assert_eq!(e.options["maxLength"], OptionValue::Int(10));
        assert!(!e.options.contains_key("minLength"));
        assert_eq!(e.options["unique"], OptionValue::Bool(true));
    }

    #[test]
    fn test_ranges_and_const() {
        let e = scan("Integer=[0, *]");
        assert_eq!(e.options["minInclusive"], OptionValue::Int(0));
        assert!(!e.options.contains_key("maxInclusive"));

        let e = scan("Number=(0.5, 1.0]");
        assert_eq!(e.options["minExclusive"], OptionValue::Float(0.5));
        assert_eq!(e.options["maxInclusive"], OptionValue::Float(1.0));

        let e = scan("Integer=7");
        assert_eq!(e.options["const"], OptionValue::Int(7));
    }

    #[test]
    fn test_pattern_format_and_attributes() {
        let e = scan(r#"String{pattern="^[a-z]{2}$"}{1..2} /lang extends(Base) default("en")"#);
        assert_eq!(e.options["pattern"], OptionValue::Text("^[a-z]{2}$".into()));
        assert_eq!(e.options["maxLength"], OptionValue::Int(2));
        assert_eq!(e.options["format"], OptionValue::Text("lang".into()));
        assert_eq!(e.options["extends"], OptionValue::Ref("Base".into()));
        assert_eq!(e.options["default"], OptionValue::Text("en".into()));
    }

    #[test]
    fn test_field_qualifiers() {
        let e = scan("!Body(TagId[kind])");
        assert!(e.not);
        assert_eq!(e.tagid, Some(TagRef::Name("kind".into())));
        assert_eq!(scan("Body(TagId[2])").tagid, Some(TagRef::Id(2)));
    }

    #[test]
    fn test_choice_and_derived() {
        let e = scan("Choice(oneOf)");
        assert_eq!(e.options["combine"], OptionValue::Text("X".into()));
        let e = scan("Enumerated(Enum[Color])");
        assert_eq!(e.options["enum"], OptionValue::Ref("Color".into()));
        let e = scan("Map#");
        assert_eq!(e.options["id"], OptionValue::Bool(true));
    }

    #[test]
    fn test_errors() {
        assert!(parse(table(), "").is_err());
        assert!(parse(table(), "MapOf(String)").is_err());
        assert!(parse(table(), "String{3}").is_err());
        assert!(parse(table(), "Integer=[x, 3]").is_err());
        assert!(parse(table(), "String bogus").is_err());
        assert!(parse(table(), "String unique unique").is_err());
    }

    #[test]
    fn test_print_round_trip() {
        for text in [
            "Integer=[0, 100]",
            "Number=(0.0, *]",
            "MapOf(Enum[Color], Pointer[Doc]){1..*}",
            "ArrayOf(String){0..5} unique",
            r#"String{pattern="^\d+$"}{1..*} /digits"#,
            "Record final extends(Base)",
            r#"Boolean default(true)"#,
            r#"String const("x")"#,
            "Integer=3",
            "Choice(anyOf)",
            "Enumerated(Pointer[Msg])",
        ] {
            let e = scan(text);
            assert_eq!(print(&e.name, &e.options, None), text);
        }
    }
}
