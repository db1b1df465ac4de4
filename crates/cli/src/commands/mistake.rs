//! `mathdesk mistake` / `mathdesk photo`: Analyze a student's mistake.

use super::{CmdResult, Globals, InputArgs, open_tutor, read_input};
use crate::render;
use mathdesk_tutor::ImageAttachment;
use std::path::Path;

pub async fn text(globals: &Globals, student: &str, input: &InputArgs) -> CmdResult {
    let problem = read_input(input)?;
    let mut tutor = open_tutor(globals).await?;

    let analysis = tutor.analyze_mistake(student, &problem).await?;
    print!("{}", render::report(render::MISTAKE_REPORT, &analysis));
    println!("\n✅ 分析已保存！");
    Ok(())
}

pub async fn photo(globals: &Globals, student: &str, image: &Path, note: Option<&str>) -> CmdResult {
    let image = ImageAttachment::from_path(image).await?;
    let mut tutor = open_tutor(globals).await?;

    let analysis = tutor.analyze_image(student, &image, note).await?;
    print!("{}", render::report(render::PHOTO_REPORT, &analysis));
    println!("\n✅ 分析已保存！");
    Ok(())
}
