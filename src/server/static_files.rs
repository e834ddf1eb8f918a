//! The HTML entry form.

use axum::response::{Html, IntoResponse};

/// Form with repeated `name[]` / `link[]` rows, posted as multipart.
const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>QR Batch</title>
<style>
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
.row { display: flex; gap: 0.5rem; margin-bottom: 0.5rem; }
.row input { flex: 1; }
</style>
</head>
<body>
<h1>QR Batch</h1>
<form method="post" action="/generate" enctype="multipart/form-data">
<div id="rows">
<div class="row">
<input name="name[]" placeholder="Label" required>
<input name="link[]" placeholder="https://..." required>
</div>
</div>
<button type="button" onclick="addRow()">Add row</button>
<button type="submit">Generate ZIP</button>
</form>
<script>
function addRow() {
  const row = document.querySelector('.row').cloneNode(true);
  row.querySelectorAll('input').forEach(i => i.value = '');
  document.getElementById('rows').appendChild(row);
}
</script>
</body>
</html>
"#;

/// GET / - serve the entry form.
pub async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}
