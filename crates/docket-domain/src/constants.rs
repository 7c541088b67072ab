//! Shared constants for the legal events table and extraction prompt

/// Column headers of the standard legal events table, in their fixed order.
pub const FIVE_COLUMN_HEADERS: [&str; 5] = [
    "No",
    "Date",
    "Event Particulars",
    "Citation",
    "Document Reference",
];

/// Sentinel for an event without a legal citation
pub const DEFAULT_NO_CITATION: &str = "No citation available";

/// Sentinel for an event whose source document is unknown
pub const DEFAULT_NO_REFERENCE: &str = "Unknown document";

/// Sentinel for an event whose particulars are structurally missing
pub const DEFAULT_NO_PARTICULARS: &str = "Event details not available";

/// Sentinel for an event without a date
pub const DEFAULT_NO_DATE: &str = "Date not available";

/// Citation used on fallback records
pub const FALLBACK_CITATION: &str = "No citation available (extraction failed)";

/// System prompt sent to every provider.
///
/// Each extracted item must carry exactly four keys; `document_reference` is
/// left empty by the model and filled from document metadata afterwards.
pub const LEGAL_EVENTS_PROMPT: &str = concat!(
    "You extract legal events from documents. For every event return a JSON object ",
    "with exactly these four keys:\n",
    "\n",
    "1. \"event_particulars\" (required): a complete description of what happened, ",
    "2-8 sentences, covering the parties, the procedural background and why it ",
    "matters. Quote or paraphrase the document. This field must never be empty.\n",
    "2. \"citation\": the legal authority cited for the event (statute, rule, case, ",
    "docket number), copied verbatim. Use \"\" when the document cites none.\n",
    "3. \"document_reference\": always \"\". It is filled in automatically with the ",
    "source file name.\n",
    "4. \"date\": the specific date of the event, preferably as YYYY-MM-DD. Use \"\" ",
    "when no date is given.\n",
    "\n",
    "Rules:\n",
    "- Use \"\" for missing values, except \"event_particulars\" which is never ",
    "blank.\n",
    "- Only put real legal references mentioned in the text into \"citation\".\n",
    "- Include every legally significant event: proceedings, filings, agreements, ",
    "hearings, orders and deadlines.",
);

/// Instruction appended to the system prompt when the provider cannot enforce JSON natively
pub const JSON_ARRAY_INSTRUCTION: &str = concat!(
    "Return only a valid JSON array of event objects, ",
    "with no commentary and no markdown code fences.",
);

/// Instruction appended to the system prompt when the provider enforces a JSON object
pub const JSON_OBJECT_INSTRUCTION: &str =
    "Return a JSON object with a single key \"events\" holding the array of event objects.";
