use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", "PATIENT")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "MEDECIN")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "PATIENT")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "ADMIN")
    }

    pub fn uuid(&self) -> Uuid {
        Uuid::parse_str(&self.id).expect("test user ids are UUIDs")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// Row shapes as PostgREST returns them for the clinic tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient_response(id: &str, prenom: &str, nom: &str) -> serde_json::Value {
        json!({
            "id": id,
            "prenom": prenom,
            "nom": nom,
            "email": format!("{}.{}@example.com", prenom.to_lowercase(), nom.to_lowercase())
        })
    }

    pub fn medecin_response(id: &str, prenom: &str, nom: &str, specialite: &str) -> serde_json::Value {
        json!({
            "id": id,
            "prenom": prenom,
            "nom": nom,
            "email": format!("dr.{}@example.com", nom.to_lowercase()),
            "specialite": specialite
        })
    }

    pub fn notification_response(id: &str, destinataire_id: &str, type_destinataire: &str, kind: &str, contenu: &str) -> serde_json::Value {
        json!({
            "id": id,
            "destinataire_id": destinataire_id,
            "type_destinataire": type_destinataire,
            "type": kind,
            "contenu": contenu,
            "date": "2025-07-25T14:25:00Z",
            "lue": false
        })
    }

    pub fn rendezvous_response(id: &str, patient_id: &str, medecin_id: &str, date: &str, heure: &str) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "medecin_id": medecin_id,
            "date": date,
            "heure": heure,
            "motif": "Suivi",
            "statut": "PLANIFIE",
            "specialite": "CARDIOLOGUE",
            "type": "TELECONSULTATION",
            "demande_id": null,
            "patient": Self::patient_response(patient_id, "Awa", "Diop"),
            "medecin": Self::medecin_response(medecin_id, "Moussa", "Ndiaye", "CARDIOLOGUE")
        })
    }

    pub fn demande_response(id: &str, patient_id: &str, specialite: &str, statut: &str) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "specialite": specialite,
            "motif": "Douleurs thoraciques",
            "statut": statut,
            "medecin_id": null,
            "created_at": "2025-07-25T09:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
