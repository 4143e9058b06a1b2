//! Templates compiled into the binary.

/// HTML page designs, by name.
pub const TEMPLATES: [(&str, &str); 2] = [
    ("simple", include_str!("../../assets/templates/simple.html")),
    ("terminal", include_str!("../../assets/templates/terminal.html")),
];

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "simple";

pub const JSON_FORMAT: &str = r#"{
  "error": true,
  "code": "{{ code }}",
  "message": {{ message | json }},
  "description": {{ description | json }}{% if show_details %},
  "details": {
    "host": {{ host | json }},
    "original_uri": {{ original_uri | json }},
    "forwarded_for": {{ forwarded_for | json }},
    "namespace": {{ namespace | json }},
    "ingress_name": {{ ingress_name | json }},
    "service_name": {{ service_name | json }},
    "service_port": {{ service_port | json }},
    "request_id": {{ request_id | json }},
    "timestamp": {{ now(utc=true) | json }}
  }{% endif %}
}
"#;

pub const XML_FORMAT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<error>
  <code>{{ code }}</code>
  <message>{{ escape_html(s=message) }}</message>
  <description>{{ escape_html(s=description) }}</description>{% if show_details %}
  <details>
    <host>{{ escape_html(s=host) }}</host>
    <originalURI>{{ escape_html(s=original_uri) }}</originalURI>
    <forwardedFor>{{ escape_html(s=forwarded_for) }}</forwardedFor>
    <namespace>{{ escape_html(s=namespace) }}</namespace>
    <ingressName>{{ escape_html(s=ingress_name) }}</ingressName>
    <serviceName>{{ escape_html(s=service_name) }}</serviceName>
    <servicePort>{{ escape_html(s=service_port) }}</servicePort>
    <requestID>{{ escape_html(s=request_id) }}</requestID>
    <timestamp>{{ now(utc=true) }}</timestamp>
  </details>{% endif %}
</error>
"#;

pub const PLAIN_FORMAT: &str = r#"Error {{ code }}: {{ message }}{% if description %}
{{ description }}{% endif %}{% if show_details %}

Host: {{ host }}
Original URI: {{ original_uri }}
Forwarded For: {{ forwarded_for }}
Namespace: {{ namespace }}
Ingress Name: {{ ingress_name }}
Service Name: {{ service_name }}
Service Port: {{ service_port }}
Request ID: {{ request_id }}
Timestamp: {{ now(utc=true) }}{% endif %}
"#;
