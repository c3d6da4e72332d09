use super::PromptSet;

pub static GERMAN: PromptSet = PromptSet {
    auto_agent_instructions: AUTO_AGENT_INSTRUCTIONS,
    choose_agent: CHOOSE_AGENT_TEMPLATE,
    search_queries: SEARCH_QUERIES_TEMPLATE,
    summary: SUMMARY_TEMPLATE,
    writer_system: WRITER_SYSTEM_PROMPT,
    research_report: RESEARCH_REPORT_TEMPLATE,
    resource_report: RESOURCE_REPORT_TEMPLATE,
    outline_report: OUTLINE_REPORT_TEMPLATE,
};

const AUTO_AGENT_INSTRUCTIONS: &str = r#"Diese Aufgabe beinhaltet die Recherche zu einem gegebenen Thema, unabhängig von seiner Komplexität oder der Verfügbarkeit einer definitiven Antwort. Die Recherche wird von einem spezifischen Agenten durchgeführt, definiert durch seinen Typ und seine Rolle, wobei jeder Agent unterschiedliche Anweisungen benötigt.
Agent
Der Agent wird durch das Gebiet des Themas und den spezifischen Namen des Agenten bestimmt, der zur Erforschung des gegebenen Themas genutzt werden könnte. Agenten sind nach ihrem Fachgebiet kategorisiert, und jeder Agententyp ist einem entsprechenden Emoji zugeordnet.

Antworte ausschließlich mit einem einzelnen JSON-Objekt mit den Schlüsseln "agent" und "agent_role_prompt".

examples:
task: "Sollte ich in Apple-Aktien investieren?"
response:
{
    "agent": "💰 Finanz Agent",
    "agent_role_prompt": "Du bist ein erfahrener Finanzanalyse-KI-Assistent. Dein Hauptziel ist es, umfassende, scharfsinnige, unparteiische und methodisch strukturierte Finanzberichte auf Basis der bereitgestellten Daten und Trends zu erstellen."
}
task: "Könnte der Weiterverkauf von Sneakern profitabel werden?"
response:
{
    "agent": "📈 Business Analyst Agent",
    "agent_role_prompt": "Du bist ein erfahrener KI-Business-Analyst-Assistent. Dein Hauptziel ist es, umfassende, aufschlussreiche, unparteiische und systematisch strukturierte Geschäftsberichte auf Basis von bereitgestellten Geschäftsdaten, Markttrends und strategischen Analysen zu produzieren."
}
task: "Was sind die interessantesten Orte in Tel Aviv?"
response:
{
    "agent": "🌍 Reise Agent",
    "agent_role_prompt": "Du bist ein weltgereister KI-Reiseführer-Assistent. Dein Hauptzweck ist es, fesselnde, aufschlussreiche, unvoreingenommene und gut strukturierte Reiseberichte über gegebene Orte zu verfassen, einschließlich Geschichte, Attraktionen und kulturellen Einblicken."
}"#;

const CHOOSE_AGENT_TEMPLATE: &str = "task: {task}";

const SEARCH_QUERIES_TEMPLATE: &str = r#"Schreibe 5 Google-Suchanfragen, um online eine objektive Meinung zu folgender Frage zu finden: {question}
Du musst mit einer Liste von Strings im folgenden Format antworten: ["Anfrage 1", "Anfrage 2", "Anfrage 3"]."#;

const SUMMARY_TEMPLATE: &str = r#"{text}

-----------

Mit dem obigen Text, beantworte kurz die folgende Frage:

> {question}

-----------
Falls die Frage nicht mit dem Text beantwortet werden kann, fasse den Text kurz zusammen. Schließe alle faktischen Informationen, Zahlen, Statistiken usw. ein, falls verfügbar."#;

const WRITER_SYSTEM_PROMPT: &str = "Du bist ein KI-Forschungsassistent für kritisches Denken. Dein einziger Zweck ist es, gut geschriebene, kritisch anerkannte, objektive und strukturierte Berichte zu vorgegebenen Texten zu verfassen.";

const RESEARCH_REPORT_TEMPLATE: &str = r#"Information:
--------
{research_summary}
--------

Mit den oben genannten Informationen beantworte die folgende Frage oder das Thema: "{question}" in einem ausführlichen Bericht --
Der Bericht sollte sich auf die Antwort der Frage konzentrieren, gut strukturiert, informativ,
tiefgehend sein, mit Fakten und Zahlen, falls verfügbar, und mindestens 1.200 Wörter umfassen.

Du solltest dich bemühen, den Bericht so lang wie möglich zu schreiben, unter Verwendung aller relevanten und notwendigen Informationen.
Du musst den Bericht in Markdown-Syntax verfassen.
Du MUSST deine eigene konkrete und valide Meinung auf Basis der gegebenen Informationen bilden. Weiche NICHT zu allgemeinen und bedeutungslosen Schlussfolgerungen ab.
Schreibe alle verwendeten Quellen-URLs am Ende des Berichts und achte darauf, keine doppelten Quellen hinzuzufügen, sondern nur einen Verweis für jede.
Du musst den Bericht im APA-Format verfassen.
Bitte gib dein Bestes, das ist sehr wichtig für meine Karriere."#;

const RESOURCE_REPORT_TEMPLATE: &str = r#"Information:
--------
{research_summary}
--------

Basierend auf den oben genannten Informationen, erstelle einen Empfehlungsbericht für Bibliografie für die folgende Frage oder das Thema: "{question}".
Der Bericht sollte eine detaillierte Analyse jeder empfohlenen Ressource bieten, wobei erläutert wird, wie jede Quelle zur Beantwortung der Forschungsfrage beitragen kann.
Konzentriere dich auf die Relevanz, Zuverlässigkeit und Bedeutung jeder Quelle.
Stelle sicher, dass der Bericht gut strukturiert, informativ, tiefgehend ist und der Markdown-Syntax folgt.
Schließe relevante Fakten, Zahlen und Daten ein, wann immer verfügbar.
Der Bericht sollte eine Mindestlänge von 1.200 Wörtern haben.

Bitte gib dein Bestes, das ist sehr wichtig für meine Karriere."#;

const OUTLINE_REPORT_TEMPLATE: &str = r#"Information:
--------
{research_summary}
--------

Mit den oben genannten Informationen erstelle ein Gerüst für einen Forschungsbericht in Markdown-Syntax für die folgende Frage oder das Thema: "{question}".
Das Gerüst sollte einen gut strukturierten Rahmen für den Forschungsbericht bieten, einschließlich der Hauptabschnitte, Unterabschnitte und der wichtigsten zu behandelnden Punkte.
Der Forschungsbericht sollte detailliert, informativ, tiefgehend sein und mindestens 1.200 Wörter umfassen.
Verwende die entsprechende Markdown-Syntax, um das Gerüst zu formatieren und die Lesbarkeit zu gewährleisten.

Bitte gib dein Bestes, das ist sehr wichtig für meine Karriere."#;
