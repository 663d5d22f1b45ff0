use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

/// Decoded operations of one page, all content streams concatenated.
pub fn page_operations(bytes: &[u8], page_index: usize) -> Vec<Operation> {
    let doc = Document::load_mem(bytes).expect("output should be a readable PDF");
    let page_id = *doc
        .get_pages()
        .values()
        .nth(page_index)
        .expect("page exists");
    let content = doc.get_page_content(page_id).expect("page content");
    Content::decode(&content).expect("decodable content").operations
}

pub fn count_operator(operations: &[Operation], operator: &str) -> usize {
    operations.iter().filter(|op| op.operator == operator).count()
}

/// Operands of every `re` operator as `[x, y, width, height]`.
pub fn rectangles(operations: &[Operation]) -> Vec<[f32; 4]> {
    operations
        .iter()
        .filter(|op| op.operator == "re")
        .map(|op| {
            let mut values = [0.0; 4];
            for (slot, operand) in values.iter_mut().zip(&op.operands) {
                *slot = number(operand);
            }
            values
        })
        .collect()
}

/// Text shown by every `Tj` operator.
pub fn shown_text(operations: &[Operation]) -> Vec<String> {
    operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|operand| operand.as_str().ok())
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

/// `Td` origins, in order.
pub fn text_origins(operations: &[Operation]) -> Vec<(f32, f32)> {
    operations
        .iter()
        .filter(|op| op.operator == "Td" && op.operands.len() == 2)
        .map(|op| (number(&op.operands[0]), number(&op.operands[1])))
        .collect()
}

pub fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("expected a number, found {other:?}"),
    }
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}
