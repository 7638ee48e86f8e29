// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_spec_file(examples: usize) -> String {
    let mut content = String::from("describe 'generated' do\n");
    for i in 0..examples {
        content.push_str(&format!("  let(:item_{i}) {{ create(:item, index: {i}) }}\n"));
        content.push_str(&format!("  it 'handles item {i}' do\n"));
        content.push_str(&format!("    expect(item_{i}.index).to eq({i})\n"));
        content.push_str("  end\n\n");
    }
    content.push_str("end\n");
    content
}

/// Line index of the last `it` body, deep in the generated file
#[allow(dead_code)]
pub fn last_example_body_line(examples: usize) -> usize {
    1 + (examples - 1) * 5 + 2
}
