//! Keyword tables used by the classifier.
//!
//! Terms ending in `*` match any word starting with the stem; all other terms
//! must match a whole word. Matching is case-insensitive.

use serde::{Deserialize, Serialize};

use super::{EventCategory, Issue};

/// A weighted lexicon term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub pattern: String,
    pub weight: f32,
}

impl Term {
    pub fn new(pattern: impl Into<String>, weight: f32) -> Self {
        Self {
            pattern: pattern.into(),
            weight,
        }
    }

    /// Check whether a lowercase word matches this term.
    pub fn matches(&self, word: &str) -> bool {
        term_matches(&self.pattern, word)
    }
}

/// Match a lowercase word against a pattern (`stem*` or whole word).
pub fn term_matches(pattern: &str, word: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(stem) => word.starts_with(stem),
        None => word == pattern,
    }
}

/// A topic term: matching words tag the item with a topic and an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTerm {
    pub pattern: String,
    pub topic: String,
    pub issue: Issue,
}

/// All classifier tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    pub relevance: Vec<Term>,
    /// Summed relevance weight that maps to a score of 100.
    pub relevance_saturation: f32,
    pub controversy: Vec<Term>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub topics: Vec<TopicTerm>,
    pub categories: Vec<(EventCategory, Vec<String>)>,
    /// Words that introduce a person ("Senator Smith").
    pub person_titles: Vec<String>,
    /// Words that make a capitalized run an organization ("Acme Corp").
    pub organization_markers: Vec<String>,
    /// Words that make a capitalized run a location ("Cook County").
    pub location_markers: Vec<String>,
    /// Prepositions that introduce a location ("in Ohio").
    pub location_prepositions: Vec<String>,
    /// Verbs that usually follow a person ("Smith said").
    pub person_verbs: Vec<String>,
    /// Verbs that usually follow an organization ("the Council voted").
    pub organization_verbs: Vec<String>,
    /// Capitalized words never treated as entity names.
    pub stopwords: Vec<String>,
}

fn terms(entries: &[(&str, f32)]) -> Vec<Term> {
    entries.iter().map(|(p, w)| Term::new(*p, *w)).collect()
}

fn words(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

fn topics(entries: &[(&str, &str, Issue)]) -> Vec<TopicTerm> {
    entries
        .iter()
        .map(|(pattern, topic, issue)| TopicTerm {
            pattern: pattern.to_string(),
            topic: topic.to_string(),
            issue: *issue,
        })
        .collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            relevance: terms(&[
                ("senat*", 15.0),
                ("congress*", 15.0),
                ("governor*", 15.0),
                ("mayor*", 12.0),
                ("president*", 15.0),
                ("legislat*", 12.0),
                ("parliament*", 12.0),
                ("minister*", 10.0),
                ("council*", 8.0),
                ("election*", 15.0),
                ("elected", 10.0),
                ("campaign*", 10.0),
                ("vote", 8.0),
                ("votes", 8.0),
                ("voted", 8.0),
                ("voter*", 8.0),
                ("ballot*", 8.0),
                ("poll", 6.0),
                ("polls", 6.0),
                ("bill", 8.0),
                ("policy", 8.0),
                ("policies", 8.0),
                ("govern*", 10.0),
                ("tax*", 8.0),
                ("budget*", 8.0),
                ("official*", 6.0),
                ("lawmaker*", 12.0),
                ("reform*", 6.0),
                ("regulat*", 6.0),
                ("court*", 5.0),
                ("public", 3.0),
                ("federal", 5.0),
                ("state", 3.0),
                ("city", 3.0),
            ]),
            relevance_saturation: 60.0,
            controversy: terms(&[
                ("brib*", 35.0),
                ("corrupt*", 35.0),
                ("scandal*", 35.0),
                ("impeach*", 35.0),
                ("fraud*", 30.0),
                ("indict*", 30.0),
                ("embezzl*", 30.0),
                ("cover-up", 30.0),
                ("alleg*", 25.0),
                ("misconduct", 25.0),
                ("riot*", 25.0),
                ("probe", 20.0),
                ("probes", 20.0),
                ("investigat*", 20.0),
                ("outrage*", 20.0),
                ("accus*", 20.0),
                ("controvers*", 20.0),
                ("resign*", 15.0),
                ("protest*", 15.0),
                ("leak*", 15.0),
                ("lawsuit*", 15.0),
                ("backlash", 15.0),
            ]),
            positive: words(&[
                "win*", "won", "success*", "praise*", "boost*", "improv*", "growth", "record",
                "celebrat*", "support*", "agree*", "rescue*", "gain*", "approv*", "recover*",
                "breakthrough", "thriv*", "help*",
            ]),
            negative: words(&[
                "fail*", "crisis", "scandal*", "brib*", "corrupt*", "collaps*", "death*", "dead",
                "kill*", "attack*", "probe", "loss*", "lost", "declin*", "cut", "cuts",
                "shortage*", "disaster*", "fraud*", "accus*", "protest*", "outrage*", "fear*",
                "threat*",
            ]),
            topics: topics(&[
                ("econom*", "economy", Issue::Economy),
                ("job*", "jobs", Issue::Economy),
                ("unemploy*", "jobs", Issue::Economy),
                ("inflation", "inflation", Issue::Economy),
                ("wage*", "wages", Issue::Economy),
                ("tax*", "taxes", Issue::Taxes),
                ("budget*", "budget", Issue::Taxes),
                ("health*", "healthcare", Issue::Healthcare),
                ("hospital*", "healthcare", Issue::Healthcare),
                ("medic*", "healthcare", Issue::Healthcare),
                ("immigra*", "immigration", Issue::Immigration),
                ("border*", "border security", Issue::Immigration),
                ("climate", "climate", Issue::Environment),
                ("environment*", "environment", Issue::Environment),
                ("pollution", "pollution", Issue::Environment),
                ("emission*", "emissions", Issue::Environment),
                ("school*", "schools", Issue::Education),
                ("educat*", "education", Issue::Education),
                ("teacher*", "education", Issue::Education),
                ("crime*", "crime", Issue::Crime),
                ("police", "policing", Issue::Crime),
                ("shooting*", "public safety", Issue::Crime),
                ("military", "defense", Issue::Defense),
                ("defense", "defense", Issue::Defense),
                ("troop*", "defense", Issue::Defense),
                ("brib*", "bribery", Issue::Ethics),
                ("corrupt*", "corruption", Issue::Ethics),
                ("ethic*", "ethics", Issue::Ethics),
                ("embezzl*", "embezzlement", Issue::Ethics),
                ("road*", "roads", Issue::Infrastructure),
                ("bridge*", "bridges", Issue::Infrastructure),
                ("transit", "transit", Issue::Infrastructure),
                ("infrastructure", "infrastructure", Issue::Infrastructure),
                ("treaty", "treaties", Issue::ForeignPolicy),
                ("tariff*", "trade", Issue::ForeignPolicy),
                ("sanction*", "sanctions", Issue::ForeignPolicy),
                ("diplomat*", "diplomacy", Issue::ForeignPolicy),
                ("election*", "elections", Issue::Elections),
                ("ballot*", "ballot access", Issue::Elections),
                ("voter*", "voting rights", Issue::Elections),
            ]),
            categories: vec![
                (
                    EventCategory::Scandal,
                    words(&[
                        "scandal*", "brib*", "corrupt*", "affair", "leak*", "misconduct",
                        "embezzl*", "cover-up", "fraud*", "impeach*", "indict*",
                    ]),
                ),
                (
                    EventCategory::Crisis,
                    words(&[
                        "crisis", "disaster*", "emergenc*", "flood*", "hurricane*", "earthquake*",
                        "outbreak*", "wildfire*", "shooting*", "attack*", "explosion*",
                        "collaps*", "shortage*", "evacuat*",
                    ]),
                ),
                (
                    EventCategory::Policy,
                    words(&[
                        "bill", "bills", "legislat*", "policy", "policies", "reform*", "regulat*",
                        "law", "laws", "ordinance*", "mandate*", "proposal*",
                    ]),
                ),
                (
                    EventCategory::Election,
                    words(&[
                        "election*", "campaign*", "poll", "polls", "polling", "ballot*",
                        "primar*", "debate*", "voter*", "candidate*", "endorse*",
                    ]),
                ),
                (
                    EventCategory::Economy,
                    words(&[
                        "econom*", "inflation", "job*", "unemploy*", "market*", "recession*",
                        "budget*", "tax*", "wage*", "trade", "deficit*",
                    ]),
                ),
                (
                    EventCategory::Diplomacy,
                    words(&[
                        "diplomat*", "treaty", "summit*", "sanction*", "ambassador*", "foreign",
                        "allies", "alliance*", "tariff*", "embass*",
                    ]),
                ),
                (
                    EventCategory::Community,
                    words(&[
                        "school*", "park*", "festival*", "neighborhood*", "library",
                        "libraries", "volunteer*", "charity", "local", "parade*", "fair",
                    ]),
                ),
            ],
            person_titles: words(&[
                "senator", "sen.", "governor", "gov.", "mayor", "president", "representative",
                "rep.", "congressman", "congresswoman", "councilman", "councilwoman",
                "councilmember", "judge", "justice", "secretary", "minister", "dr.", "mr.",
                "mrs.", "ms.", "ceo", "chairman", "chairwoman", "sheriff", "commissioner",
                "attorney", "candidate", "speaker",
            ]),
            organization_markers: words(&[
                "inc", "inc.", "corp", "corp.", "corporation", "company", "co.", "llc", "party",
                "committee", "department", "council", "union", "association", "bank", "agency",
                "ministry", "bureau", "commission", "foundation", "institute", "university",
                "board", "group", "times", "post", "news", "court", "senate", "house",
                "congress", "legislature", "administration",
            ]),
            location_markers: words(&[
                "city", "county", "state", "district", "valley", "heights", "springs", "river",
                "lake", "island", "province", "township", "borough",
            ]),
            location_prepositions: words(&["in", "at", "from", "across", "near", "outside", "to"]),
            person_verbs: words(&[
                "said", "says", "faces", "denies", "denied", "admits", "admitted", "resigns",
                "resigned", "vows", "vowed", "claims", "claimed", "told", "argued", "insists",
                "slams", "defends", "defended", "criticizes", "criticized", "wins", "won",
                "loses", "lost", "signs", "signed", "unveils", "unveiled", "backs", "blocks",
                "proposes", "proposed", "calls", "pushes", "rejects", "rejected", "meets",
                "praised", "praises", "blasts", "warns", "warned", "sues", "sued", "launches",
            ]),
            organization_verbs: words(&[
                "announced", "announces", "reported", "reports", "ruled", "rules", "issued",
                "issues", "released", "releases", "approved", "approves", "passed", "passes",
            ]),
            stopwords: words(&[
                "the", "a", "an", "and", "or", "but", "of", "in", "on", "at", "for", "to",
                "with", "by", "from", "as", "over", "after", "before", "amid", "into", "new",
                "this", "that", "these", "those", "it", "its", "he", "she", "they", "we", "his",
                "her", "their", "our", "is", "are", "was", "were", "be", "will", "would",
                "could", "should", "may", "not", "no", "yes", "why", "how", "what", "who",
                "when", "where", "breaking", "update", "exclusive", "report", "local",
                "national", "officials", "monday", "tuesday", "wednesday", "thursday",
                "friday", "saturday", "sunday", "today", "tonight", "yesterday", "tomorrow",
            ]),
        }
    }
}

impl Lexicon {
    /// True when the word is any scoring keyword (relevance, controversy,
    /// sentiment, topic or category). Keywords are never entity names.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.relevance.iter().any(|t| t.matches(word))
            || self.controversy.iter().any(|t| t.matches(word))
            || self.positive.iter().any(|p| term_matches(p, word))
            || self.negative.iter().any(|p| term_matches(p, word))
            || self.topics.iter().any(|t| term_matches(&t.pattern, word))
            || self
                .categories
                .iter()
                .any(|(_, patterns)| patterns.iter().any(|p| term_matches(p, word)))
    }
}
