use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};

use super::{CryptoError, Result};

/// JWT utilities.
pub struct JwtUtils;

impl JwtUtils {
    /// Sign claims with an RSA private key (RS256).
    pub fn create_jwt<T: Serialize>(rsa_priv_key: &str, claims: &T) -> Result<String> {
        let key = Self::parse_encoding_key(rsa_priv_key)?;

        encode(&Header::new(Algorithm::RS256), claims, &key)
            .map_err(|e| CryptoError::JwtCreationFailed { source: e })
    }

    /// Decode a JWT without checking its signature nor its expiration.
    pub fn decode_jwt<T>(token: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(decode(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| CryptoError::JwtVerificationFailed { source: e })?
            .claims)
    }

    /// Parse a PEM-encoded RSA private key.
    pub fn parse_encoding_key(rsa_priv_key: &str) -> Result<EncodingKey> {
        EncodingKey::from_rsa_pem(rsa_priv_key.as_bytes())
            .map_err(|e| CryptoError::InvalidEncodingKey { source: e })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::RsaUtils;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Claims {
        iss: u64,
        exp: u64,
    }

    #[test]
    fn create_then_decode() {
        let key = RsaUtils::generate_private_key();
        let claims = Claims { iss: 42, exp: 600 };

        let token = JwtUtils::create_jwt(key.as_str(), &claims).unwrap();
        let decoded: Claims = JwtUtils::decode_jwt(&token).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn invalid_key() {
        let claims = Claims { iss: 42, exp: 600 };
        assert!(matches!(
            JwtUtils::create_jwt("not a key", &claims),
            Err(CryptoError::InvalidEncodingKey { .. })
        ));
    }
}
