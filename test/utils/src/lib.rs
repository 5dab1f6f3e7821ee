pub fn help_fixture() -> &'static str {
    return r#"
{
  "api_status": "healthy",
  "knowledge_entries": 3,
  "capabilities": {
    "online_mode": "Answers questions using the knowledge base and the AI engine.",
    "offline_mode": ["Knowledge base search", "Stored answers"]
  },
  "how_to_use": {
    "ask_questions": "Type a question and press enter.",
    "add_knowledge": "Ingest a URL to teach Zark about a website."
  },
  "setup_instructions": {
    "groq_api_key": "Set GROQ_API_KEY in the backend environment."
  }
}
"#
    .trim();
}

pub fn knowledge_fixture() -> &'static str {
    return r#"
{
  "knowledge": [
    {
      "id": "6a1f",
      "title": "Artificial intelligence",
      "url": "https://en.wikipedia.org/wiki/Artificial_intelligence",
      "summary": "Intelligence of machines.",
      "entities": ["Alan Turing"],
      "tags": ["technology"],
      "ingested_at": "2026-10-01T12:00:00"
    },
    {
      "id": "7b2e",
      "title": "Machine learning",
      "url": "https://en.wikipedia.org/wiki/Machine_learning",
      "summary": "Statistical learning.",
      "entities": [],
      "tags": [],
      "ingested_at": "2026-10-01T11:00:00"
    }
  ],
  "total": 42,
  "recent_count": 2
}
"#
    .trim();
}
