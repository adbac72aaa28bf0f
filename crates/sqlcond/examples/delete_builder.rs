//! Build a DELETE statement from mixed conditions and print SQL and arguments.
//!
//! Run with: cargo run -p sqlcond --example delete_builder

use sqlcond::{CondResult, Condition, DeleteBuilder, Flavor, SqlText, Value};

fn main() -> CondResult<()> {
    let mut db = DeleteBuilder::new();
    db.delete_from("demo.user");

    let id = db.compile(&Condition::gt("id", 1234));
    let name = db.compile(&Condition::like("name", "%Du"));
    let id_card = db.compile(&Condition::is_null("id_card"));
    let status = db.compile(&Condition::in_list("status", [1, 2, 5]));
    let either = db.or([id_card, status]);
    // Arbitrary SQL can be mixed with bound values.
    let tail = SqlText::raw("modified_at > created_at + ").then(db.var(86400));

    db.where_text(id)
        .where_text(name)
        .where_text(either)
        .where_text(tail);

    let (sql, args) = db.build()?;
    println!("{sql}");
    println!("{}", show_args(&args));

    let (sql, _) = db.build_with_flavor(Flavor::PostgreSql)?;
    println!("{sql}");

    Ok(())
}

fn show_args(args: &[Value]) -> String {
    let shown: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("[{}]", shown.join(" "))
}
