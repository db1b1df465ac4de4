//! `mathdesk student`: Manage student archives.

use super::{CmdResult, Globals, open_tutor};
use crate::render;

pub async fn add(globals: &Globals, name: &str) -> CmdResult {
    let mut tutor = open_tutor(globals).await?;
    tutor.create_student(name).await?;
    println!("✅ 已为【{name}】建立档案！");
    Ok(())
}

pub async fn list(globals: &Globals) -> CmdResult {
    let tutor = open_tutor(globals).await?;
    let students = tutor.students();

    if students.is_empty() {
        println!("👈 还没有学生档案。先运行：mathdesk student add <姓名>");
        return Ok(());
    }

    println!("🗂️ 学生档案 ({})", students.len());
    for name in &students {
        let records = tutor.history(name).map(<[_]>::len).unwrap_or_default();
        println!("  • {name}  ({records} 条记录)");
    }
    Ok(())
}

pub async fn show(globals: &Globals, name: &str) -> CmdResult {
    let tutor = open_tutor(globals).await?;
    let records = tutor.history(name)?;
    print!("{}", render::history(name, records));
    Ok(())
}
