//! Prompt assembly for question answering and application drafting.
//!
//! All prompts instruct the model to answer in plain text; inline-markup
//! conversion happens afterwards in [`format`](crate::format) for
//! application bodies only.

/// System instruction for CV question answering.
pub const QA_SYSTEM: &str = "You are an expert HR assistant. Answer questions ONLY using \
    information from the provided CV context. If the information is not in the context, \
    clearly state that. Be precise and accurate - do not make assumptions or provide \
    information not explicitly mentioned in the CV. Provide answers in plain text without \
    any markdown formatting (no **, __, or other markdown symbols).";

/// System instruction for cover-letter drafting.
pub const COVER_LETTER_SYSTEM: &str = "You are an expert career advisor specializing in \
    writing compelling cover letters that get results.";

/// System instruction for application-email drafting.
pub const EMAIL_SYSTEM: &str = "You are an expert career advisor specializing in writing \
    compelling job application emails.";

/// Build the user message for a CV question.
pub fn qa_user(context: &str, question: &str) -> String {
    format!(
        "CV Context:\n{context}\n\nQuestion: {question}\n\nAnswer based ONLY on the CV \
         context above in plain text format. If the answer is not in the context, say 'I \
         cannot find that information in your CV.'"
    )
}

/// Build the user message for a cover letter.
pub fn cover_letter_user(cv_context: &str, job_description: &str) -> String {
    format!(
        "You are an expert career advisor and professional writer. Create a compelling, \
         personalized cover letter based on the candidate's CV and the job description.\n\n\
         CV Information:\n{cv_context}\n\n\
         Job Description:\n{job_description}\n\n\
         Requirements:\n\
         1. Write a professional, engaging cover letter (3-4 paragraphs)\n\
         2. Highlight relevant skills, experiences, and achievements from the CV that match \
         the job requirements\n\
         3. Show enthusiasm and cultural fit\n\
         4. Include specific examples and accomplishments\n\
         5. Make it personal and authentic, not generic\n\
         6. Use professional tone and proper business letter format\n\
         7. Start with a strong opening that captures attention\n\
         8. End with a clear call to action\n\
         9. Write in plain text without any markdown formatting (no **, __, or other \
         markdown symbols)\n\n\
         Generate ONLY the cover letter content (no additional commentary). Include proper \
         salutation and closing."
    )
}

/// Build the user message for an application email.
///
/// The `SUBJECT:`/`BODY:` convention here is what
/// [`parser::parse_email`](crate::parser::parse_email) expects back.
pub fn email_user(cv_context: &str, job_description: &str) -> String {
    format!(
        "You are an expert career advisor and professional writer. Create a compelling, \
         personalized job application email based on the candidate's CV and the job \
         description.\n\n\
         CV Information:\n{cv_context}\n\n\
         Job Description:\n{job_description}\n\n\
         Requirements:\n\
         1. Create a catchy, professional email subject line\n\
         2. Write a concise but impactful email body (2-3 short paragraphs)\n\
         3. Highlight the most relevant skills and experiences that match the job\n\
         4. Show enthusiasm and fit for the role\n\
         5. Include 1-2 specific achievements or examples\n\
         6. Keep it professional yet personable\n\
         7. End with a clear call to action\n\
         8. Keep the email concise - suitable for email format (shorter than a cover letter)\n\
         9. Write in plain text without any markdown formatting (no **, __, or other \
         markdown symbols)\n\n\
         Format your response EXACTLY as follows:\n\
         SUBJECT: [your subject line here]\n\n\
         BODY:\n\
         [your email content here including greeting and closing]\n\n\
         Generate ONLY the subject and body (no additional commentary)."
    )
}
