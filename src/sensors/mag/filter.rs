use nalgebra::Vector3;

/// Nombre d'échantillons moyennés par défaut
pub const AVERAGE_TIMES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Buffer circulaire de taille fixe pour un axe
#[derive(Clone, Debug)]
pub struct AxisFilter<const N: usize> {
    buf: [f32; N],
    index: usize,
    is_full: bool,
}

impl<const N: usize> AxisFilter<N> {
    pub const fn new() -> Self {
        assert!(N > 0, "AxisFilter capacity must be non-zero");
        AxisFilter { buf: [0.0; N], index: 0, is_full: false }
    }

    /// Ecrit l'échantillon à l'index courant puis avance (modulo N)
    pub fn push(&mut self, sample: f32) {
        self.buf[self.index] = sample;
        self.index += 1;
        if self.index >= N {
            self.index = 0;
            self.is_full = true;
        }
    }

    /// Nombre d'échantillons valides
    pub fn count(&self) -> usize {
        if self.is_full {
            N
        } else {
            self.index
        }
    }

    pub fn is_full(&self) -> bool {
        self.is_full
    }

    /// Moyenne des échantillons valides, 0 si le buffer est vide
    pub fn average(&self) -> f32 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }

        let sum: f32 = self.buf[..count].iter().sum();
        sum / count as f32
    }
}

impl<const N: usize> Default for AxisFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Filtre moyenneur logiciel, un buffer par axe.
///
/// Les trois axes sont toujours mis à jour et lus ensemble : l'appelant garde le verrou de
/// l'état du capteur pendant `push_sample` et `average_vector`.
#[derive(Clone, Debug, Default)]
pub struct SoftFilter<const N: usize = AVERAGE_TIMES> {
    axes: [AxisFilter<N>; 3],
}

impl<const N: usize> SoftFilter<N> {
    pub const fn new() -> Self {
        SoftFilter { axes: [AxisFilter::new(), AxisFilter::new(), AxisFilter::new()] }
    }

    pub fn push(&mut self, axis: Axis, sample: f32) {
        self.axes[axis as usize].push(sample);
    }

    pub fn push_sample(&mut self, sample: &Vector3<f32>) {
        for axis in Axis::ALL {
            self.push(axis, sample[axis as usize]);
        }
    }

    pub fn average(&self, axis: Axis) -> f32 {
        self.axes[axis as usize].average()
    }

    pub fn average_vector(&self) -> Vector3<f32> {
        // Tant qu'un axe est vide, on renvoie un vecteur nul
        if self.axes.iter().any(|axis| axis.count() == 0) {
            return Vector3::zeros();
        }

        Vector3::new(self.average(Axis::X), self.average(Axis::Y), self.average(Axis::Z))
    }
}
