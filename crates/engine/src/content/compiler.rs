use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::debug;

use super::database::{CellCategory, CellTypeDef, CellTypeRegistry};
use super::discovery::{collect_xml_files_sorted, discover_def_sources};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefErrorCode {
    Discovery,
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDefInSource,
}

#[derive(Debug, Clone)]
pub struct CellDefError {
    pub code: DefErrorCode,
    pub message: String,
    pub source_id: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for CellDefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (source={}, file={}, line={}, column={})",
                self.code,
                self.message,
                self.source_id,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (source={}, file={})",
                self.code,
                self.message,
                self.source_id,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for CellDefError {}

/// Merges every `<CellDef>` found under `def_dirs` into `base`. A later
/// directory overrides an earlier one (and the base) by `defName`.
pub fn compile_cell_registry(
    mut base: CellTypeRegistry,
    def_dirs: &[PathBuf],
) -> Result<CellTypeRegistry, CellDefError> {
    let sources = discover_def_sources(def_dirs)?;

    for source in sources {
        let xml_files = collect_xml_files_sorted(&source.source_dir)
            .map_err(|error| read_error(&source.source_id, error.path, error.source))?;
        let mut seen_in_source = HashSet::<String>::new();

        for xml_file in xml_files {
            let raw = fs::read_to_string(&xml_file)
                .map_err(|err| read_error(&source.source_id, xml_file.clone(), err))?;
            let defs = parse_cell_defs(&source.source_id, &xml_file, &raw)?;
            for def in defs {
                if !seen_in_source.insert(def.def_name.clone()) {
                    return Err(CellDefError {
                        code: DefErrorCode::DuplicateDefInSource,
                        message: format!(
                            "duplicate CellDef '{}' in source '{}'",
                            def.def_name, source.source_id
                        ),
                        source_id: source.source_id.clone(),
                        file_path: xml_file.clone(),
                        location: None,
                    });
                }
                let def_name = def.def_name.clone();
                base.register(def).ok_or_else(|| CellDefError {
                    code: DefErrorCode::InvalidValue,
                    message: format!(
                        "cannot register CellDef '{def_name}': all {} cell type ids are taken",
                        base.len()
                    ),
                    source_id: source.source_id.clone(),
                    file_path: xml_file.clone(),
                    location: None,
                })?;
            }
        }
        debug!(
            source = %source.source_id,
            load_index = source.load_index,
            cell_types = base.len(),
            "cell_defs_merged"
        );
    }

    Ok(base)
}

pub fn parse_cell_defs(
    source_id: &str,
    file_path: &Path,
    raw: &str,
) -> Result<Vec<CellTypeDef>, CellDefError> {
    let doc = Document::parse(raw).map_err(|error| CellDefError {
        code: DefErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        source_id: source_id.to_string(),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let ctx = ParseCtx {
        source_id,
        file_path,
        doc: &doc,
    };
    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(ctx.error_at(
            DefErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            root,
        ));
    }

    let mut defs = Vec::<CellTypeDef>::new();
    for child in root.children().filter(|node| node.is_element()) {
        if child.tag_name().name() != "CellDef" {
            return Err(ctx.error_at(
                DefErrorCode::UnknownDefType,
                format!(
                    "unsupported def type <{}>; only <CellDef> is recognised",
                    child.tag_name().name()
                ),
                child,
            ));
        }
        defs.push(parse_cell_def(&ctx, child)?);
    }

    Ok(defs)
}

struct ParseCtx<'a, 'input> {
    source_id: &'a str,
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl ParseCtx<'_, '_> {
    fn error_at(&self, code: DefErrorCode, message: String, node: Node<'_, '_>) -> CellDefError {
        let pos = self.doc.text_pos_at(node.range().start);
        CellDefError {
            code,
            message,
            source_id: self.source_id.to_string(),
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }

    fn required_text(&self, node: Node<'_, '_>, field_name: &str) -> Result<String, CellDefError> {
        let value = node.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error_at(
                DefErrorCode::MissingField,
                format!("field <{}> must not be empty", field_name),
                node,
            ));
        }
        Ok(value)
    }

    fn finite_number(&self, node: Node<'_, '_>, field_name: &str) -> Result<f32, CellDefError> {
        let value = self.required_text(node, field_name)?;
        match value.parse::<f32>() {
            Ok(parsed) if parsed.is_finite() => Ok(parsed),
            _ => Err(self.error_at(
                DefErrorCode::InvalidValue,
                format!("{} '{}' is not a finite number", field_name, value),
                node,
            )),
        }
    }
}

fn parse_cell_def(ctx: &ParseCtx<'_, '_>, node: Node<'_, '_>) -> Result<CellTypeDef, CellDefError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut def_name: Option<String> = None;
    let mut label: Option<String> = None;
    let mut category: Option<CellCategory> = None;
    let mut density: Option<f32> = None;
    let mut temperature: Option<f32> = None;
    let mut flags = Vec::<String>::new();

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        if !seen_fields.insert(field_name.clone()) {
            return Err(ctx.error_at(
                DefErrorCode::DuplicateField,
                format!("duplicate field <{}> in <CellDef>", field_name),
                field,
            ));
        }

        match field_name.as_str() {
            "defName" => def_name = Some(ctx.required_text(field, "defName")?),
            "label" => label = Some(ctx.required_text(field, "label")?),
            "category" => {
                let value = ctx.required_text(field, "category")?;
                let parsed = CellCategory::parse(&value).ok_or_else(|| {
                    ctx.error_at(
                        DefErrorCode::InvalidValue,
                        format!(
                            "invalid category '{}'; allowed values: Solid, Powder, Liquid, Gas, Energy, Organic, Tool, Special",
                            value
                        ),
                        field,
                    )
                })?;
                category = Some(parsed);
            }
            "density" => {
                let parsed = ctx.finite_number(field, "density")?;
                if parsed <= 0.0 {
                    return Err(ctx.error_at(
                        DefErrorCode::InvalidValue,
                        "density must be > 0".to_string(),
                        field,
                    ));
                }
                density = Some(parsed);
            }
            "temperature" => temperature = Some(ctx.finite_number(field, "temperature")?),
            "flags" => {
                for token in field
                    .text()
                    .unwrap_or_default()
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                {
                    if !matches!(token, "hazard" | "edible" | "protected" | "heatSource") {
                        return Err(ctx.error_at(
                            DefErrorCode::InvalidValue,
                            format!(
                                "unknown flag '{}'; allowed flags: hazard, edible, protected, heatSource",
                                token
                            ),
                            field,
                        ));
                    }
                    flags.push(token.to_string());
                }
            }
            _ => {
                return Err(ctx.error_at(
                    DefErrorCode::UnknownField,
                    format!("unknown field <{}> in <CellDef>", field_name),
                    field,
                ))
            }
        }
    }

    let Some(def_name) = def_name else {
        return Err(ctx.error_at(
            DefErrorCode::MissingField,
            "missing required field <defName> in <CellDef>".to_string(),
            node,
        ));
    };
    let Some(category) = category else {
        return Err(ctx.error_at(
            DefErrorCode::MissingField,
            "missing required field <category> in <CellDef>".to_string(),
            node,
        ));
    };

    let has_flag = |name: &str| flags.iter().any(|flag| flag == name);
    let mut def = CellTypeDef::new(&def_name, category);
    def.label = label.unwrap_or_else(|| def_name.clone());
    def.density = density.unwrap_or(1.0);
    def.temperature = temperature.unwrap_or(20.0);
    def.hazard = has_flag("hazard");
    def.edible = has_flag("edible");
    def.protected = has_flag("protected");
    def.heat_source = has_flag("heatSource");
    Ok(def)
}

fn read_error(source_id: &str, path: PathBuf, source: std::io::Error) -> CellDefError {
    CellDefError {
        code: DefErrorCode::ReadFile,
        message: format!("failed to read XML file: {source}"),
        source_id: source_id.to_string(),
        file_path: path,
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    fn parse(raw: &str) -> Result<Vec<CellTypeDef>, CellDefError> {
        parse_cell_defs("test", Path::new("defs.xml"), raw)
    }

    #[test]
    fn full_def_parses_every_field() {
        let defs = parse(
            r#"<Defs><CellDef>
                <defName>lava</defName><label>Lava</label><category>Liquid</category>
                <density>3.1</density><temperature>1100</temperature>
                <flags>hazard, heatSource</flags>
            </CellDef></Defs>"#,
        )
        .expect("parse");
        let lava = &defs[0];
        assert_eq!(lava.def_name, "lava");
        assert_eq!(lava.label, "Lava");
        assert_eq!(lava.category, CellCategory::Liquid);
        assert!((lava.density - 3.1).abs() < f32::EPSILON);
        assert!(lava.hazard && lava.heat_source);
        assert!(!lava.edible && !lava.protected);
    }

    #[test]
    fn optional_fields_default() {
        let xml =
            "<Defs><CellDef><defName>dust</defName><category>Powder</category></CellDef></Defs>";
        let defs = parse(xml).expect("parse");
        assert_eq!(defs[0].label, "dust");
        assert!((defs[0].density - 1.0).abs() < f32::EPSILON);
        assert!((defs[0].temperature - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_category_reports_location() {
        let err = parse("<Defs><CellDef><defName>x</defName></CellDef></Defs>").expect_err("err");
        assert_eq!(err.code, DefErrorCode::MissingField);
        assert!(err.location.is_some());
    }

    #[test]
    fn unknown_field_errors() {
        let err = parse(
            "<Defs><CellDef><defName>a</defName><category>Solid</category><mood>calm</mood></CellDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, DefErrorCode::UnknownField);
    }

    #[test]
    fn unknown_flag_errors() {
        let err = parse(
            "<Defs><CellDef><defName>a</defName><category>Solid</category><flags>sticky</flags></CellDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, DefErrorCode::InvalidValue);
    }

    #[test]
    fn non_positive_density_errors() {
        let err = parse(
            "<Defs><CellDef><defName>a</defName><category>Gas</category><density>0</density></CellDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, DefErrorCode::InvalidValue);
    }

    #[test]
    fn wrong_root_errors() {
        let err = parse("<Things/>").expect_err("err");
        assert_eq!(err.code, DefErrorCode::InvalidRoot);
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = parse("<Defs><CellDef><defName>a</defName></Defs>").expect_err("err");
        assert_eq!(err.code, DefErrorCode::XmlMalformed);
        assert!(err.location.is_some());
    }

    #[test]
    fn later_source_overrides_earlier_by_def_name() {
        let temp = TempDir::new().expect("temp");
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        write_file(
            &first.join("cells.xml"),
            "<Defs><CellDef><defName>goo</defName><label>Goo</label><category>Liquid</category></CellDef></Defs>",
        );
        write_file(
            &second.join("cells.xml"),
            "<Defs><CellDef><defName>goo</defName><label>Acidic Goo</label><category>Liquid</category><flags>hazard</flags></CellDef></Defs>",
        );

        let dirs = [first, second];
        let registry = compile_cell_registry(CellTypeRegistry::default(), &dirs).expect("compile");
        let id = registry.id_by_name("goo").expect("id");
        let def = registry.def(id).expect("def");
        assert_eq!(def.label, "Acidic Goo");
        assert!(def.hazard);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn new_def_past_id_limit_errors() {
        let mut base = CellTypeRegistry::default();
        for idx in 0..=usize::from(u16::MAX) {
            let def = CellTypeDef::new(&format!("filler_{idx}"), CellCategory::Solid);
            base.register(def).expect("id below limit");
        }
        let temp = TempDir::new().expect("temp");
        let dir = temp.path().join("extra");
        write_file(
            &dir.join("cells.xml"),
            "<Defs><CellDef><defName>slime</defName><category>Liquid</category></CellDef></Defs>",
        );

        let err = compile_cell_registry(base, &[dir]).expect_err("err");
        assert_eq!(err.code, DefErrorCode::InvalidValue);
        assert!(err.message.contains("slime"), "{}", err.message);
        assert!(err.file_path.ends_with("cells.xml"));
    }

    #[test]
    fn same_source_duplicate_errors() {
        let temp = TempDir::new().expect("temp");
        let dir = temp.path().join("pack");
        write_file(
            &dir.join("cells.xml"),
            r#"<Defs>
                <CellDef><defName>a</defName><category>Solid</category></CellDef>
                <CellDef><defName>a</defName><category>Powder</category></CellDef>
            </Defs>"#,
        );
        let err = compile_cell_registry(CellTypeRegistry::default(), &[dir]).expect_err("err");
        assert_eq!(err.code, DefErrorCode::DuplicateDefInSource);
        assert_eq!(err.source_id, "pack");
    }
}
