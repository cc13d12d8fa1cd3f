use super::*;

#[test]
fn test_format_primitives_and_literals() {
    let interner = TypeInterner::new();
    assert_eq!(interner.display(TypeId::STRING), "string");
    assert_eq!(interner.display(TypeId::UNDEFINED), "undefined");
    assert_eq!(interner.display(interner.literal_string("Tomas")), "\"Tomas\"");
    assert_eq!(interner.display(interner.literal_number(1157.0)), "1157");
    assert_eq!(interner.display(interner.literal_number(2.5)), "2.5");
    assert_eq!(interner.display(TypeId::BOOLEAN_FALSE), "false");
}

#[test]
fn test_format_string_literal_escapes_quotes() {
    let interner = TypeInterner::new();
    assert_eq!(interner.display(interner.literal_string("say \"hi\"")), "\"say \\\"hi\\\"\"");
}

#[test]
fn test_format_union_in_written_order() {
    let interner = TypeInterner::new();
    let union = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    assert_eq!(interner.display(union), "string | number");
}

#[test]
fn test_format_array_of_union_is_parenthesized() {
    let interner = TypeInterner::new();
    let union = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    assert_eq!(interner.display(interner.array(union)), "(string | number)[]");
    assert_eq!(interner.display(interner.array(TypeId::BOOLEAN)), "boolean[]");
}

#[test]
fn test_format_tuples() {
    let interner = TypeInterner::new();
    let pair = interner.readonly_tuple(vec![
        interner.literal_number(1157.0),
        interner.literal_string("Tomas"),
    ]);
    assert_eq!(interner.display(pair), "readonly [1157, \"Tomas\"]");
    let mutable = interner.tuple(vec![TypeId::BOOLEAN, TypeId::NUMBER]);
    assert_eq!(interner.display(mutable), "[boolean, number]");
    assert_eq!(interner.display(interner.tuple(Vec::new())), "[]");
}

#[test]
fn test_format_function_with_optional_and_rest() {
    let interner = TypeInterner::new();
    let name = |s: &str| interner.intern_string(s);
    let func = interner.function(FunctionShape::new(
        vec![
            ParamInfo::required(name("values"), interner.array(TypeId::STRING)),
            ParamInfo::optional(name("count"), TypeId::NUMBER),
        ],
        TypeId::NUMBER,
    ));
    assert_eq!(interner.display(func), "(values: string[], count?: number) => number");

    let variadic = interner.function(FunctionShape::new(
        vec![ParamInfo::rest(name("songs"), interner.array(TypeId::STRING))],
        TypeId::VOID,
    ));
    assert_eq!(interner.display(variadic), "(...songs: string[]) => void");
}

#[test]
fn test_format_unnamed_params_get_positional_names() {
    let interner = TypeInterner::new();
    let func = interner.function(FunctionShape::new(
        vec![ParamInfo::unnamed(TypeId::STRING)],
        TypeId::VOID,
    ));
    assert_eq!(interner.display(func), "(arg0: string) => void");
}

#[test]
fn test_format_function_in_union_is_parenthesized() {
    let interner = TypeInterner::new();
    let func = interner.function(FunctionShape::new(Vec::new(), TypeId::STRING));
    let union = interner.union(vec![func, TypeId::UNDEFINED]);
    assert_eq!(interner.display(union), "(() => string) | undefined");
}

#[test]
fn test_format_objects() {
    let interner = TypeInterner::new();
    let pages = interner.intern_string("pages");
    let author = interner.intern_string("author");
    let book = interner.object(vec![
        PropertyInfo::new(pages, TypeId::NUMBER),
        PropertyInfo::opt(author, TypeId::STRING),
    ]);
    assert_eq!(interner.display(book), "{ pages: number; author?: string; }");
    assert_eq!(interner.display(interner.object(Vec::new())), "{}");
}

#[test]
fn test_format_readonly_member_and_method() {
    let interner = TypeInterner::new();
    let id = interner.intern_string("id");
    let describe = interner.intern_string("describe");
    let method = interner.function(FunctionShape::new(Vec::new(), TypeId::STRING));
    let obj = interner.object(vec![
        PropertyInfo::readonly(id, TypeId::NUMBER),
        PropertyInfo::method(describe, method),
    ]);
    assert_eq!(interner.display(obj), "{ readonly id: number; describe(): string; }");
}

#[test]
fn test_format_reference_prints_its_name() {
    let interner = TypeInterner::new();
    assert_eq!(interner.display(interner.reference("Writer")), "Writer");
}

#[test]
fn test_format_foreign_id() {
    let interner = TypeInterner::new();
    assert_eq!(interner.display(TypeId(99_999)), "<unknown type 99999>");
}
