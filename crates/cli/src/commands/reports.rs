//! `mathdesk progress|prep|quiz|parallel`: Reports that are not archived.

use super::{CmdResult, Globals, InputArgs, open_tutor, read_input};
use crate::render;
use mathdesk_tutor::{Difficulty, QuizRequest};

pub async fn progress(globals: &Globals, student: &str) -> CmdResult {
    let tutor = open_tutor(globals).await?;
    let report = tutor.progress_report(student).await?;
    print!("{}", render::report(render::PROGRESS_REPORT, &report));
    Ok(())
}

pub async fn prep(globals: &Globals, input: &InputArgs) -> CmdResult {
    let exam = read_input(input)?;
    let tutor = open_tutor(globals).await?;
    let report = tutor.lecture_prep(&exam).await?;
    print!("{}", render::report(render::PREP_REPORT, &report));
    Ok(())
}

pub async fn quiz(globals: &Globals, topic: String, count: u8, difficulty: &str) -> CmdResult {
    let difficulty: Difficulty = difficulty.parse()?;
    let request = QuizRequest::new(topic, count, difficulty);
    request.validate()?;

    let tutor = open_tutor(globals).await?;
    let quiz = tutor.generate_quiz(&request).await?;
    print!("{}", render::report(render::QUIZ_REPORT, &quiz));
    Ok(())
}

pub async fn parallel(globals: &Globals, input: &InputArgs) -> CmdResult {
    let paper = read_input(input)?;
    let tutor = open_tutor(globals).await?;
    let exam = tutor.generate_parallel_exam(&paper).await?;
    print!("{}", render::report(render::PARALLEL_REPORT, &exam));
    Ok(())
}
