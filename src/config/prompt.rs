use crate::models::participant::Participant;

pub const ELECTION_YEAR: u32 = 2028;
pub const TOTAL_QUESTIONS: usize = 78;
pub const SECONDS_PER_QUESTION: u32 = 15;

pub fn intro_prompt(participant: &Participant) -> String {
    format!(
        "You are a {age}-year-old {gender} with a {education} degree living in {state}.\n\
         You are participating in a survey conducted before a future U.S. presidential election, scheduled to take place in {year}.\n\
         At the time of this survey, the election has not yet occurred and the candidates are not yet known.\n\
         You will be asked about how likely you think it is that the Republican or Democratic candidate will win the popular vote in various U.S. states.\n\
         There will be {total} questions in total. Please respond promptly\u{2014}aim to spend no more than {seconds} seconds per question.\n\
         The task is designed to capture your first impressions, not careful calculations.\n\
         For each question, respond with a number between 0 and 100, reflecting your intuitive judgment.\n\
         Do not rely on factual knowledge or hindsight\u{2014}respond as if you are making genuine predictions under uncertainty.",
        age = participant.age,
        gender = participant.gender,
        education = participant.education,
        state = participant.state,
        year = ELECTION_YEAR,
        total = TOTAL_QUESTIONS,
        seconds = SECONDS_PER_QUESTION,
    )
}

pub fn question_prompt(question: &str) -> String {
    format!(
        "Question: {}\n\
         Answer with a single number between 0 and 100. Do not include any additional text or characters.",
        question
    )
}
