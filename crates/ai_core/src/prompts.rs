//! Locale-specific prompts for the chat-completion model

use chrono::{Datelike, Utc};
use domain::{Locale, Query};

/// Appended to Hindi queries so the model answers in Hindi
pub const HINDI_REPLY_SUFFIX: &str = "कृपया उत्तर हिंदी में दें।";

/// System prompt for `locale`, mentioning the current year
pub fn system_prompt(locale: Locale) -> String {
    let year = Utc::now().year();
    match locale {
        Locale::En => format!(
            "You are an AI assistant specialized in Indian government schemes.\n\
             - Provide only accurate information from official government sources like india.gov.in, mygov.in, and ministry websites\n\
             - Be concise and factual\n\
             - If unsure, say you don't know rather than guessing\n\
             - Format responses clearly with scheme name, eligibility, benefits, and application process\n\
             - Include relevant official links when possible\n\
             - Current year is {year}"
        ),
        Locale::Hi => format!(
            "आप भारत सरकार की योजनाओं में विशेषज्ञता प्राप्त एक सहायक हैं।\n\
             - केवल आधिकारिक सरकारी स्रोतों जैसे india.gov.in, mygov.in और मंत्रालयों की वेबसाइटों से सटीक जानकारी दें\n\
             - संक्षिप्त और तथ्यात्मक रहें\n\
             - यदि सुनिश्चित नहीं हैं तो अनुमान लगाने के बजाय कहें कि आपको नहीं पता\n\
             - योजना का नाम, पात्रता, लाभ और आवेदन प्रक्रिया स्पष्ट रूप से बताएं\n\
             - संभव हो तो प्रासंगिक आधिकारिक लिंक शामिल करें\n\
             - वर्तमान वर्ष {year} है"
        ),
    }
}

/// User message content for `query` in `locale`
pub fn user_content(query: &Query, locale: Locale) -> String {
    match locale {
        Locale::En => query.as_str().to_string(),
        Locale::Hi => format!("{} {HINDI_REPLY_SUFFIX}", query.as_str()),
    }
}
