//! Confirmation Code Generator

/// Produces short opaque confirmation codes
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `[A-Za-z0-9]` codes from the OS-seeded thread RNG
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        platform::crypto::random_alphanumeric(self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_codes() {
        let generator = RandomCodeGenerator::new(6);
        let a = generator.generate();
        assert_eq!(a.len(), 6);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, generator.generate());
    }
}
