//! Prompt templates for the four gateway calls.

use std::fmt::Write as _;

use watchdog_core::SyntheticPost;

use crate::schema::POST_COUNT;

/// Instruction sent alongside the photo for the diagnosis call.
pub const IMAGE_DIAGNOSIS_INSTRUCTION: &str = "Analyze this image of a city issue. \
1. Identify the specific problem (e.g., potholes, illegal dumping, broken infrastructure). \
2. Estimate the severity (Low/Medium/High/Critical). \
3. Identify any potential safety hazards. \
4. Suggest which city department handles this. \
Reply in Polish, concise.";

/// Returned when the diagnosis call succeeds but yields no text.
pub const IMAGE_DIAGNOSIS_EMPTY: &str = "Nie udało się przeanalizować zdjęcia.";

/// Returned when the grounding call succeeds but yields no text.
pub const GROUNDING_EMPTY: &str = "No location data found.";

const NO_VISUAL_EVIDENCE: &str = "Brak dowodów wizualnych.";

/// Everything the campaign prompt is built from: the literal outputs of the
/// earlier stages.
#[derive(Debug, Clone, Copy)]
pub struct CampaignBrief<'a> {
    pub topic: &'a str,
    pub posts: &'a [SyntheticPost],
    pub location_context: &'a str,
    pub image_diagnosis: Option<&'a str>,
}

#[must_use]
pub fn posts_prompt(topic: &str, location: &str) -> String {
    format!(
        "Generate {POST_COUNT} realistic, angry, or concerned social media posts (in Polish) \
regarding \"{topic}\" in \"{location}\".\n\
The posts should sound like real citizens complaining.\n\
Return JSON format."
    )
}

/// Query string handed to the grounding call.
#[must_use]
pub fn grounding_query(topic: &str, location: &str) -> String {
    format!("{topic} w {location}")
}

#[must_use]
pub fn grounding_prompt(query: &str) -> String {
    format!(
        "Find real locations related to: {query}. Are there any schools, hospitals, or \
government buildings nearby that make this issue worse? Provide a short summary."
    )
}

#[must_use]
pub fn campaign_prompt(brief: &CampaignBrief<'_>) -> String {
    let mut complaints = String::new();
    for post in brief.posts {
        let _ = writeln!(complaints, "\"{}\" (- {})", post.content, post.author);
    }

    let visual = match brief.image_diagnosis.map(str::trim) {
        Some(diagnosis) if !diagnosis.is_empty() => {
            format!("DOWÓD WIDEO/FOTO (Analiza AI): {diagnosis}")
        }
        _ => NO_VISUAL_EVIDENCE.to_string(),
    };

    format!(
        r#"ACT AS: A ruthless, highly effective city activist and campaign manager.
GOAL: Force the city authorities to fix the issue: "{topic}".

INPUT DATA:
1. Citizen Complaints:
{complaints}
2. Location Context:
{location_context}

3. Visual Evidence:
{visual}

TASK:
Create a "Scandal Campaign" strategy. Exaggerate the consequences, appeal to emotions (fear, anger, pride), and directly attack the incompetence of the administration.
The tone should be ALARMIST but credible enough to go viral.

ALSO GENERATE OFFICIAL COMPLAINTS AND SOCIAL CONTENT.

OUTPUT JSON with:
- headline: A clickbait, sensational headline (Polish).
- articleContent: A short, fiery blog post/press release (Markdown supported, Polish).
- hashtags: 5 viral hashtags.
- targetAuthority: Who is to blame? (Department or Official Title).
- pressurePoints: List of 3 strategic angles to attack (e.g., "Child Safety", "Waste of Tax Money").
- officialComplaint: Object with {{ subject, recipient (generic dept), body (formal but firm complaint email) }}.
- socialContent: Object with {{ twitterPost (short, punchy, uses hashtags), facebookPost (longer, engaging, asking for shares) }}.
"#,
        topic = brief.topic,
        location_context = brief.location_context,
    )
}
