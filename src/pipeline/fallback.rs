//! Canned placeholder site used when model output cannot be recovered.
//!
//! The three templates share ids and class names (`hero`, `card`, `cta-button`,
//! `hidden-message`), so they only render correctly as a set.

const PROMPT_SLOT: &str = "{{PROMPT}}";

const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Your New Website</title>
</head>
<body>
    <main class="container">
        <section class="hero card">
            <h1>Welcome to Your New Website</h1>
            <p class="subtitle">Built from your idea:</p>
            <blockquote class="prompt">{{PROMPT}}</blockquote>
            <button id="cta-button" class="cta-button">Get Started</button>
            <p id="hidden-message" class="hidden-message">Thanks for visiting! Your site is ready to grow.</p>
        </section>
        <section class="features">
            <div class="card feature">
                <h2>Responsive</h2>
                <p>Looks great on phones, tablets and desktops.</p>
            </div>
            <div class="card feature">
                <h2>Modern</h2>
                <p>Clean layout with smooth micro-interactions.</p>
            </div>
            <div class="card feature">
                <h2>Ready to Deploy</h2>
                <p>Publish it to the web with a single click.</p>
            </div>
        </section>
    </main>
    <footer class="footer">
        <p>Generated with WebCraft</p>
    </footer>
</body>
</html>
"#;

const FALLBACK_CSS: &str = r#"* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
    min-height: 100vh;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: #2d3748;
    line-height: 1.6;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 4rem 1.5rem 2rem;
}

.card {
    background: rgba(255, 255, 255, 0.95);
    border-radius: 16px;
    box-shadow: 0 20px 40px rgba(0, 0, 0, 0.15);
    padding: 2rem;
    transition: transform 0.25s ease, box-shadow 0.25s ease;
}

.card.is-hovered {
    transform: translateY(-6px);
    box-shadow: 0 28px 50px rgba(0, 0, 0, 0.2);
}

.hero {
    text-align: center;
    margin-bottom: 2.5rem;
}

.hero h1 {
    font-size: 2.75rem;
    margin-bottom: 0.75rem;
    color: #4c51bf;
}

.subtitle {
    font-size: 1.1rem;
    color: #718096;
}

.prompt {
    margin: 1.25rem auto 2rem;
    max-width: 640px;
    font-style: italic;
    border-left: 4px solid #667eea;
    padding-left: 1rem;
    text-align: left;
}

.cta-button {
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: #fff;
    border: none;
    border-radius: 999px;
    padding: 0.9rem 2.25rem;
    font-size: 1rem;
    cursor: pointer;
    transition: transform 0.2s ease, opacity 0.2s ease;
}

.cta-button:hover {
    transform: scale(1.05);
    opacity: 0.9;
}

.hidden-message {
    display: none;
    margin-top: 1.5rem;
    font-weight: 600;
    color: #38a169;
}

.hidden-message.visible {
    display: block;
}

.features {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 1.5rem;
}

.feature h2 {
    font-size: 1.25rem;
    margin-bottom: 0.5rem;
    color: #553c9a;
}

.footer {
    text-align: center;
    color: rgba(255, 255, 255, 0.85);
    padding: 2rem 1rem;
}

@media (max-width: 768px) {
    .hero h1 {
        font-size: 2rem;
    }

    .features {
        grid-template-columns: 1fr;
    }
}
"#;

const FALLBACK_JS: &str = r#"document.addEventListener('DOMContentLoaded', function () {
    var button = document.getElementById('cta-button');
    var message = document.getElementById('hidden-message');

    if (button && message) {
        button.addEventListener('click', function () {
            message.classList.add('visible');
            button.textContent = 'Welcome aboard!';
        });
    }

    document.querySelectorAll('.card').forEach(function (card) {
        card.addEventListener('mouseenter', function () {
            card.classList.add('is-hovered');
        });
        card.addEventListener('mouseleave', function () {
            card.classList.remove('is-hovered');
        });
    });
});
"#;

pub fn fallback_html(prompt: &str) -> String {
    let prompt = prompt.trim();
    let shown = if prompt.is_empty() {
        "A brand new website"
    } else {
        prompt
    };
    FALLBACK_HTML.replace(PROMPT_SLOT, &html_escape::encode_text(shown))
}

pub fn fallback_css() -> String {
    FALLBACK_CSS.to_string()
}

pub fn fallback_js() -> String {
    FALLBACK_JS.to_string()
}
