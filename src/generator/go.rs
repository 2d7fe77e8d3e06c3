use once_cell::sync::Lazy;
use regex::Regex;

use super::{quote, CodeGenerator, GeneratorOptions, Schema, SumStyle};
use crate::ast::{Definition, Field, Product, Sum, SumStr, Type};

static GO_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

fn go_primitive(id: &str) -> Option<&'static str> {
    match id {
        "Float" => Some("float32"),
        "Str" => Some("string"),
        "Bool" => Some("bool"),
        "Int" => Some("int"),
        "Any" => Some("any"),
        "Object" => Some("map[string]any"),
        "Date" => Some("time.Time"),
        _ => None,
    }
}

pub(super) fn is_valid_package_name(name: &str) -> bool {
    GO_IDENTIFIER.is_match(name)
}

/// One `Name Type `json:"..."`` line of a struct body
struct StructField {
    name: String,
    ty: String,
    tag: String,
}

/// Emits a Go package of structs, string types and constants
pub struct GoGenerator {
    options: GeneratorOptions,
}

impl GoGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    fn definition(&self, definition: &Definition) -> String {
        match definition {
            Definition::Product(p) => self.product(p),
            Definition::Sum(s) => self.sum(s),
            Definition::SumStr(s) => self.sum_str(s),
        }
    }

    fn product(&self, product: &Product) -> String {
        let fields = product
            .fields
            .iter()
            .map(|f| struct_field(f, false))
            .collect::<Vec<_>>();
        render_struct(&product.id, &fields)
    }

    /// Sum variants become pointer fields; at most one is set on the wire
    fn sum(&self, sum: &Sum) -> String {
        let mut out = String::new();
        let mut fields = Vec::with_capacity(sum.variants.len() + 1);

        if self.options.sum_style == SumStyle::Tagged {
            let tag_type = format!("{}_Type", sum.id);
            let constants = sum
                .variants
                .iter()
                .map(|v| {
                    (
                        format!("{}_{}", tag_type, v.id),
                        v.json_key().to_string(),
                    )
                })
                .collect::<Vec<_>>();
            out.push_str(&render_string_type(&tag_type, &constants));
            fields.push(StructField {
                name: "Type".to_string(),
                ty: tag_type,
                tag: json_tag(&self.options.sum_tag, false),
            });
        }

        fields.extend(sum.variants.iter().map(|v| struct_field(v, true)));
        out.push_str(&render_struct(&sum.id, &fields));
        out
    }

    fn sum_str(&self, sum_str: &SumStr) -> String {
        let constants = sum_str
            .variants
            .iter()
            .map(|v| (format!("{}_{}", sum_str.id, v.id), v.value().to_string()))
            .collect::<Vec<_>>();
        render_string_type(&sum_str.id, &constants)
    }
}

impl CodeGenerator for GoGenerator {
    fn name(&self) -> &'static str {
        "go"
    }

    fn generate(&self, schema: Schema<'_>) -> String {
        let mut out = format!("package {}\n\n", self.options.go_package_name);
        if schema.used_primitives.contains("Date") {
            out.push_str("import \"time\"\n\n");
        }
        for definition in schema.definitions {
            out.push_str(&self.definition(definition));
        }
        let trimmed_len = out.trim_end_matches('\n').len();
        out.truncate(trimmed_len);
        out.push('\n');
        out
    }
}

fn struct_field(field: &Field, force_pointer: bool) -> StructField {
    let optional = field.ty.is_nullable() || force_pointer;
    StructField {
        name: capitalize_head(&field.id),
        ty: render_type(&field.ty, force_pointer),
        tag: json_tag(field.json_key(), optional),
    }
}

fn json_tag(key: &str, omit_empty: bool) -> String {
    let omit = if omit_empty { ",omitempty" } else { "" };
    format!("`json:\"{key}{omit}\"`")
}

fn render_type(ty: &Type, force_pointer: bool) -> String {
    let pointer = if ty.is_nullable() || force_pointer {
        "*"
    } else {
        ""
    };
    match ty {
        Type::List { inner, .. } => format!("{pointer}[]{}", render_type(inner, false)),
        Type::Ident { id, .. } => {
            format!("{pointer}{}", go_primitive(id).unwrap_or(id.as_str()))
        }
    }
}

/// Struct with columns aligned the way gofmt lays them out
fn render_struct(name: &str, fields: &[StructField]) -> String {
    let name_width = fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
    let type_width = fields.iter().map(|f| f.ty.len()).max().unwrap_or(0);

    let mut out = format!("type {name} struct {{\n");
    for field in fields {
        out.push_str(&format!(
            "\t{:<name_width$} {:<type_width$} {}\n",
            field.name, field.ty, field.tag
        ));
    }
    out.push_str("}\n");
    out
}

fn render_string_type(name: &str, constants: &[(String, String)]) -> String {
    let mut out = format!("type {name} string\n\n");
    for (constant, value) in constants {
        out.push_str(&format!("const {constant} {name} = {}\n", quote(value)));
    }
    if !constants.is_empty() {
        out.push('\n');
    }
    out
}

fn capitalize_head(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::ast::SumStrVariant;

    fn field(id: &str, ty: Type) -> Field {
        Field {
            id: id.to_string(),
            json_name: None,
            ty,
        }
    }

    fn generate(definitions: &[Definition], used: &[&str], options: GeneratorOptions) -> String {
        let used: BTreeSet<String> = used.iter().map(|s| (*s).to_string()).collect();
        GoGenerator::new(options).generate(Schema {
            definitions,
            used_primitives: &used,
        })
    }

    fn options(package: &str) -> GeneratorOptions {
        GeneratorOptions {
            go_package_name: package.to_string(),
            ..GeneratorOptions::default()
        }
    }

    #[test]
    fn test_product_alignment_and_pointers() {
        let product = Definition::Product(Product {
            id: "User".to_string(),
            fields: vec![
                field("name", Type::ident("Str", false)),
                field("age", Type::ident("Int", true)),
                field("friendIds", Type::list(Type::ident("Str", true), true)),
                field(
                    "array2d",
                    Type::list(Type::list(Type::ident("Int", true), true), false),
                ),
            ],
        });
        assert_eq!(
            generate(&[product], &[], options("main")),
            "package main\n\n\
             type User struct {\n\
             \tName      string     `json:\"name\"`\n\
             \tAge       *int       `json:\"age,omitempty\"`\n\
             \tFriendIds *[]*string `json:\"friendIds,omitempty\"`\n\
             \tArray2d   []*[]*int  `json:\"array2d\"`\n\
             }\n"
        );
    }

    #[test]
    fn test_date_imports_time() {
        let product = Definition::Product(Product {
            id: "Event".to_string(),
            fields: vec![field("at", Type::ident("Date", false))],
        });
        let out = generate(&[product], &["Date"], options("events"));
        assert!(out.starts_with("package events\n\nimport \"time\"\n\ntype Event struct {\n"));
        assert!(out.contains("\tAt time.Time `json:\"at\"`\n"));
    }

    #[test]
    fn test_sum_str_constants() {
        let sum_str = Definition::SumStr(SumStr {
            id: "Status".to_string(),
            variants: vec![
                SumStrVariant {
                    id: "Active".to_string(),
                    json_name: None,
                },
                SumStrVariant {
                    id: "Pending".to_string(),
                    json_name: Some("pending activation".to_string()),
                },
            ],
        });
        assert_eq!(
            generate(&[sum_str], &[], options("demo")),
            "package demo\n\n\
             type Status string\n\n\
             const Status_Active Status = \"Active\"\n\
             const Status_Pending Status = \"pending activation\"\n"
        );
    }

    #[test]
    fn test_tagged_sum() {
        let sum = Definition::Sum(Sum {
            id: "Data".to_string(),
            variants: vec![
                field("adminData", Type::ident("AdminData", false)),
                field("userData", Type::ident("UserData", false)),
            ],
        });
        let tagged = GeneratorOptions {
            go_package_name: "main".to_string(),
            sum_style: SumStyle::Tagged,
            sum_tag: "_type".to_string(),
        };
        assert_eq!(
            generate(&[sum], &[], tagged),
            "package main\n\n\
             type Data_Type string\n\n\
             const Data_Type_adminData Data_Type = \"adminData\"\n\
             const Data_Type_userData Data_Type = \"userData\"\n\n\
             type Data struct {\n\
             \tType      Data_Type  `json:\"_type\"`\n\
             \tAdminData *AdminData `json:\"adminData,omitempty\"`\n\
             \tUserData  *UserData  `json:\"userData,omitempty\"`\n\
             }\n"
        );
    }

    #[test]
    fn test_empty_struct() {
        let product = Definition::Product(Product {
            id: "Empty".to_string(),
            fields: vec![],
        });
        assert_eq!(
            generate(&[product], &[], options("main")),
            "package main\n\ntype Empty struct {\n}\n"
        );
    }

    #[test]
    fn test_package_name_validation() {
        assert!(is_valid_package_name("demo"));
        assert!(is_valid_package_name("types_v2"));
        assert!(!is_valid_package_name("my-types"));
        assert!(!is_valid_package_name("2fast"));
    }
}
