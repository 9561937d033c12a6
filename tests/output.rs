use todo_list::output::{format_human, HumanOutput};

#[test]
fn format_human_includes_next_steps() {
    let mut human = HumanOutput::new("Unchanged: no such task");
    human.push_line("1 task remaining");
    human.push_next_step("todo list");

    let rendered = format_human(&human);
    assert!(rendered.starts_with("Unchanged: no such task\n1 task remaining"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- todo list"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("2 tasks remaining");
    let rendered = format_human(&human);
    assert_eq!(rendered, "2 tasks remaining");
}
